use sargasso_schema::EnvSpec;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// An env spec entry as written in a project file, before inheritance
/// links are resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEnvSpec {
    pub name: String,
    pub conda_packages: Vec<String>,
    pub channels: Vec<String>,
    pub pip_packages: Vec<String>,
    pub description: Option<String>,
    pub inherit_from_name: Option<String>,
}

/// A defect found while resolving inheritance links.
///
/// Problems are accumulated, not fatal: the offending spec is still
/// constructed, carrying its `inherit_from` name with no resolved parent
/// object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveProblem {
    #[error("'inherit_from' field of env spec '{child}' does not match the name of any env spec: '{parent}'")]
    UnknownParent { child: String, parent: String },
    #[error("'inherit_from' fields create circular inheritance among these env specs: {}", .trail.join(", "))]
    CircularInheritance { trail: Vec<String> },
}

/// Outcome of [`resolve_env_specs`]: the linked spec collection keyed by
/// name, plus any problems found along the way.
#[derive(Debug, Default)]
pub struct Resolution {
    pub specs: BTreeMap<String, Arc<EnvSpec>>,
    pub problems: Vec<ResolveProblem>,
}

/// Build the linked [`EnvSpec`] collection from a project's unresolved
/// entries.
///
/// Parents are resolved depth-first by name, so inheritance chains of any
/// depth come out fully linked. A parent name already on the current
/// resolution trail is a circular-inheritance problem; a parent name that
/// matches no entry is an unknown-parent problem. Either way the child is
/// constructed with the name-only link. Output order is deterministic.
pub fn resolve_env_specs(raw_specs: &[RawEnvSpec]) -> Resolution {
    let attrs: BTreeMap<&str, &RawEnvSpec> = raw_specs
        .iter()
        .map(|raw| (raw.name.as_str(), raw))
        .collect();

    let mut resolution = Resolution::default();
    for name in attrs.keys().copied() {
        let mut trail = Vec::new();
        build_spec(name, &mut trail, &attrs, &mut resolution);
    }
    resolution
}

fn build_spec(
    name: &str,
    trail: &mut Vec<String>,
    attrs: &BTreeMap<&str, &RawEnvSpec>,
    resolution: &mut Resolution,
) -> Arc<EnvSpec> {
    if let Some(existing) = resolution.specs.get(name) {
        return Arc::clone(existing);
    }

    let raw = attrs[name];
    trail.push(raw.name.clone());

    let mut spec = EnvSpec::new(
        raw.name.as_str(),
        raw.conda_packages.clone(),
        raw.channels.clone(),
        raw.pip_packages.clone(),
    );
    if let Some(description) = &raw.description {
        spec = spec.with_description(description.clone());
    }

    if let Some(parent_name) = &raw.inherit_from_name {
        if trail.iter().any(|visited| visited == parent_name) {
            resolution.problems.push(ResolveProblem::CircularInheritance {
                trail: trail.clone(),
            });
            spec = spec.with_inherit_from(parent_name.as_str(), None);
        } else if let Some(parent_raw) = attrs.get(parent_name.as_str()) {
            let parent = build_spec(&parent_raw.name, trail, attrs, resolution);
            spec = spec.with_inherit_from(parent_name.as_str(), Some(parent));
        } else {
            resolution.problems.push(ResolveProblem::UnknownParent {
                child: raw.name.clone(),
                parent: parent_name.clone(),
            });
            spec = spec.with_inherit_from(parent_name.as_str(), None);
        }
    }

    trail.pop();
    let spec = Arc::new(spec);
    resolution.specs.insert(raw.name.clone(), Arc::clone(&spec));
    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn raw(name: &str, conda: &[&str], inherit_from: Option<&str>) -> RawEnvSpec {
        RawEnvSpec {
            name: name.to_owned(),
            conda_packages: strings(conda),
            inherit_from_name: inherit_from.map(str::to_owned),
            ..RawEnvSpec::default()
        }
    }

    #[test]
    fn links_parent_and_child() {
        let resolution = resolve_env_specs(&[
            raw("base", &["numpy"], None),
            raw("extended", &["pandas"], Some("base")),
        ]);

        assert!(resolution.problems.is_empty());
        let extended = &resolution.specs["extended"];
        assert_eq!(extended.inherit_from().unwrap().name(), "base");
        assert_eq!(
            extended.conda_packages(),
            strings(&["numpy", "pandas"])
        );
    }

    #[test]
    fn resolves_chains_of_depth_three() {
        let resolution = resolve_env_specs(&[
            raw("child", &["c"], Some("parent")),
            raw("grandparent", &["a"], None),
            raw("parent", &["b"], Some("grandparent")),
        ]);

        assert!(resolution.problems.is_empty());
        let child = &resolution.specs["child"];
        assert_eq!(child.conda_packages(), strings(&["a", "b", "c"]));
    }

    #[test]
    fn unknown_parent_is_a_problem_not_a_failure() {
        let resolution = resolve_env_specs(&[raw("orphan", &["numpy"], Some("ghost"))]);

        assert_eq!(resolution.problems.len(), 1);
        assert!(resolution.problems[0]
            .to_string()
            .contains("does not match the name of any env spec"));

        // the spec still exists, with the name-only link
        let orphan = &resolution.specs["orphan"];
        assert_eq!(orphan.inherit_from_name().unwrap(), "ghost");
        assert!(orphan.inherit_from().is_none());
        assert_eq!(orphan.conda_packages(), strings(&["numpy"]));
    }

    #[test]
    fn self_inheritance_is_circular() {
        let resolution = resolve_env_specs(&[raw("loop", &[], Some("loop"))]);

        assert_eq!(resolution.problems.len(), 1);
        assert!(matches!(
            &resolution.problems[0],
            ResolveProblem::CircularInheritance { trail } if trail == &strings(&["loop"])
        ));
        assert!(resolution.specs["loop"].inherit_from().is_none());
    }

    #[test]
    fn mutual_inheritance_is_reported_once() {
        let resolution = resolve_env_specs(&[
            raw("a", &[], Some("b")),
            raw("b", &[], Some("a")),
        ]);

        assert_eq!(resolution.problems.len(), 1);
        assert!(matches!(
            resolution.problems[0],
            ResolveProblem::CircularInheritance { .. }
        ));
        // the cycle is broken at the spec where it closed; the other side
        // still gets its resolved link
        assert_eq!(resolution.specs.len(), 2);
        assert!(resolution.specs["a"].inherit_from().is_some());
        assert!(resolution.specs["b"].inherit_from().is_none());
    }

    #[test]
    fn description_is_carried_through() {
        let mut entry = raw("documented", &[], None);
        entry.description = Some("GPU-enabled training env".to_owned());
        let resolution = resolve_env_specs(&[entry]);
        assert_eq!(
            resolution.specs["documented"].description(),
            "GPU-enabled training env"
        );
    }

    #[test]
    fn output_iterates_in_name_order() {
        let resolution = resolve_env_specs(&[
            raw("zeta", &[], None),
            raw("alpha", &[], None),
            raw("midway", &[], None),
        ]);
        let names: Vec<&str> = resolution.specs.keys().map(String::as_str).collect();
        assert_eq!(names, ["alpha", "midway", "zeta"]);
    }
}
