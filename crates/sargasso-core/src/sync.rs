use sargasso_schema::{load_environment_yml, EnvSpec};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment-description filenames probed by
/// [`find_out_of_sync_environment_file`], in priority order.
pub const ENVIRONMENT_FILENAMES: &[&str] = &["environment.yml", "environment.yaml"];

/// Check an external environment-description file against the specs a
/// project already knows about.
///
/// Returns `None` when there is nothing to reconcile: the file could not
/// be loaded, or some known spec has the same name *and* the same
/// `channels_and_packages_hash`. Otherwise the loaded spec is the
/// out-of-sync candidate — either its name is new to the project or its
/// content drifted — and the caller decides how to reconcile it.
pub fn find_out_of_sync_spec<'a, I>(known_specs: I, path: &Path) -> Option<EnvSpec>
where
    I: IntoIterator<Item = &'a EnvSpec>,
{
    let Some(loaded) = load_environment_yml(path) else {
        debug!("no environment spec loaded from {}", path.display());
        return None;
    };

    for existing in known_specs {
        if existing.name() == loaded.name()
            && existing.channels_and_packages_hash() == loaded.channels_and_packages_hash()
        {
            debug!(
                "env spec '{}' already in sync with {}",
                loaded.name(),
                path.display()
            );
            return None;
        }
    }

    info!(
        "env spec '{}' from {} is out of sync with the project",
        loaded.name(),
        path.display()
    );
    Some(loaded)
}

/// An externally authored spec that the project does not reflect yet.
#[derive(Debug)]
pub struct OutOfSyncSpec {
    /// The environment file the spec was loaded from.
    pub source: PathBuf,
    pub spec: EnvSpec,
}

/// Probe a project directory for the default environment-description
/// files and return the first out-of-sync spec found.
///
/// `environment.yml` is checked first; `environment.yaml` is only
/// consulted when the first file produced no candidate.
pub fn find_out_of_sync_environment_file<'a, I>(
    known_specs: I,
    project_dir: &Path,
) -> Option<OutOfSyncSpec>
where
    I: IntoIterator<Item = &'a EnvSpec>,
{
    let known: Vec<&EnvSpec> = known_specs.into_iter().collect();
    for filename in ENVIRONMENT_FILENAMES {
        let path = project_dir.join(filename);
        if let Some(spec) = find_out_of_sync_spec(known.iter().copied(), &path) {
            return Some(OutOfSyncSpec { source: path, spec });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn known_default() -> EnvSpec {
        EnvSpec::new(
            "default",
            strings(&["numpy"]),
            strings(&["conda-forge"]),
            Vec::new(),
        )
    }

    const MATCHING_YML: &str = "name: default\ndependencies:\n  - numpy\nchannels:\n  - conda-forge\n";

    #[test]
    fn matching_name_and_hash_is_in_sync() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("environment.yml");
        fs::write(&path, MATCHING_YML).unwrap();

        let known = known_default();
        assert!(find_out_of_sync_spec([&known], &path).is_none());
    }

    #[test]
    fn content_drift_produces_a_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("environment.yml");
        fs::write(
            &path,
            "name: default\ndependencies:\n  - numpy\n  - pandas\nchannels:\n  - conda-forge\n",
        )
        .unwrap();

        let known = known_default();
        let candidate = find_out_of_sync_spec([&known], &path).unwrap();
        assert_eq!(candidate.name(), "default");
        assert_ne!(
            candidate.channels_and_packages_hash(),
            known.channels_and_packages_hash()
        );
    }

    #[test]
    fn unknown_name_produces_a_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("environment.yml");
        fs::write(&path, "name: fresh\ndependencies:\n  - numpy\n").unwrap();

        let known = known_default();
        let candidate = find_out_of_sync_spec([&known], &path).unwrap();
        assert_eq!(candidate.name(), "fresh");
    }

    #[test]
    fn unloadable_file_means_nothing_to_reconcile() {
        let dir = tempfile::tempdir().unwrap();
        let known = known_default();
        assert!(find_out_of_sync_spec([&known], &dir.path().join("absent.yml")).is_none());
    }

    #[test]
    fn empty_known_collection_reports_any_loaded_spec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("environment.yml");
        fs::write(&path, MATCHING_YML).unwrap();

        let candidate = find_out_of_sync_spec([], &path).unwrap();
        assert_eq!(candidate.name(), "default");
    }

    #[test]
    fn probe_falls_back_to_yaml_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("environment.yaml"),
            "name: fresh\ndependencies:\n  - numpy\n",
        )
        .unwrap();

        let known = known_default();
        let found = find_out_of_sync_environment_file([&known], dir.path()).unwrap();
        assert_eq!(found.spec.name(), "fresh");
        assert!(found.source.ends_with("environment.yaml"));
    }

    #[test]
    fn probe_prefers_yml_over_yaml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("environment.yml"),
            "name: from-yml\ndependencies:\n  - numpy\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("environment.yaml"),
            "name: from-yaml\ndependencies:\n  - pandas\n",
        )
        .unwrap();

        let found = find_out_of_sync_environment_file([], dir.path()).unwrap();
        assert_eq!(found.spec.name(), "from-yml");
    }

    #[test]
    fn probe_skips_in_sync_yml_and_checks_yaml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("environment.yml"), MATCHING_YML).unwrap();
        fs::write(
            dir.path().join("environment.yaml"),
            "name: extra\ndependencies:\n  - scipy\n",
        )
        .unwrap();

        let known = known_default();
        let found = find_out_of_sync_environment_file([&known], dir.path()).unwrap();
        assert_eq!(found.spec.name(), "extra");
    }

    #[test]
    fn probe_with_no_files_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let known = known_default();
        assert!(find_out_of_sync_environment_file([&known], dir.path()).is_none());
    }
}
