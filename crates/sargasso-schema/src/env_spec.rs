use crate::diff;
use crate::package::{self, PackageSpecError};
use crate::types::{SpecHash, SpecName};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeSet;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A named, potentially inheriting declaration of conda packages, pip
/// packages, and channels.
///
/// The lists stored here are the spec's *own* declarations; the effective
/// lists seen by callers ([`conda_packages`](Self::conda_packages) and
/// friends) merge every ancestor's declarations via
/// combine-keeping-last-duplicate. An `EnvSpec` is immutable after
/// construction: the builder methods consume and return `Self`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSpec {
    name: SpecName,
    conda_packages: Vec<String>,
    channels: Vec<String>,
    pip_packages: Vec<String>,
    description: Option<String>,
    inherit_from_name: Option<SpecName>,
    inherit_from: Option<Arc<EnvSpec>>,
    channels_and_packages_hash: SpecHash,
}

impl EnvSpec {
    /// Create a spec with the given own package and channel lists, no
    /// description and no inheritance link.
    pub fn new(
        name: impl Into<SpecName>,
        conda_packages: Vec<String>,
        channels: Vec<String>,
        pip_packages: Vec<String>,
    ) -> Self {
        let mut spec = EnvSpec {
            name: name.into(),
            conda_packages,
            channels,
            pip_packages,
            description: None,
            inherit_from_name: None,
            inherit_from: None,
            channels_and_packages_hash: SpecHash::new(String::new()), // computed below
        };
        spec.channels_and_packages_hash = spec.compute_hash();
        spec
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach an inheritance link.
    ///
    /// A spec can carry a parent *name* without a resolved parent object
    /// (resolution happens elsewhere and may fail); pass `None` for
    /// `parent` in that case. The content hash is recomputed, since the
    /// effective lists change.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is given and its name differs from
    /// `parent_name`. That state means the caller linked the wrong object,
    /// which is a programming error, not an input condition.
    pub fn with_inherit_from(
        mut self,
        parent_name: impl Into<SpecName>,
        parent: Option<Arc<EnvSpec>>,
    ) -> Self {
        let parent_name = parent_name.into();
        if let Some(parent) = &parent {
            assert_eq!(
                parent.name, parent_name,
                "inherit_from spec does not match inherit_from_name"
            );
        }
        self.inherit_from_name = Some(parent_name);
        self.inherit_from = parent;
        self.channels_and_packages_hash = self.compute_hash();
        self
    }

    pub fn name(&self) -> &SpecName {
        &self.name
    }

    /// One-sentence summary of the environment; falls back to the name.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(self.name.as_str())
    }

    pub fn inherit_from_name(&self) -> Option<&SpecName> {
        self.inherit_from_name.as_ref()
    }

    pub fn inherit_from(&self) -> Option<&Arc<EnvSpec>> {
        self.inherit_from.as_ref()
    }

    /// The spec's own conda package list, without inherited entries.
    pub fn own_conda_packages(&self) -> &[String] {
        &self.conda_packages
    }

    pub fn own_channels(&self) -> &[String] {
        &self.channels
    }

    pub fn own_pip_packages(&self) -> &[String] {
        &self.pip_packages
    }

    /// Effective conda package list after merging all ancestors.
    pub fn conda_packages(&self) -> Vec<String> {
        match &self.inherit_from {
            Some(parent) => combine_keeping_last_duplicate(parent.conda_packages(), &self.conda_packages),
            None => self.conda_packages.clone(),
        }
    }

    /// Effective channel list after merging all ancestors.
    pub fn channels(&self) -> Vec<String> {
        match &self.inherit_from {
            Some(parent) => combine_keeping_last_duplicate(parent.channels(), &self.channels),
            None => self.channels.clone(),
        }
    }

    /// Effective pip package list after merging all ancestors.
    pub fn pip_packages(&self) -> Vec<String> {
        match &self.inherit_from {
            Some(parent) => combine_keeping_last_duplicate(parent.pip_packages(), &self.pip_packages),
            None => self.pip_packages.clone(),
        }
    }

    /// Digest over the effective conda packages, pip packages, and channels,
    /// in that order, each element in its effective position.
    ///
    /// Order matters: a reorder counts as a change, since list order affects
    /// installation precedence. Entries are fed to the digest without
    /// separators, so differently-segmented lists with the same
    /// concatenation collide (`["ab"]` vs `["a", "b"]`). The hash is an
    /// inequality signal for change detection, never a content-addressed
    /// identity, and that collision is accepted behavior.
    pub fn channels_and_packages_hash(&self) -> &SpecHash {
        &self.channels_and_packages_hash
    }

    fn compute_hash(&self) -> SpecHash {
        let mut hasher = blake3::Hasher::new();
        for pkg in self.conda_packages() {
            hasher.update(pkg.as_bytes());
        }
        for pkg in self.pip_packages() {
            hasher.update(pkg.as_bytes());
        }
        for channel in self.channels() {
            hasher.update(channel.as_bytes());
        }
        SpecHash::new(hasher.finalize().to_hex().to_string())
    }

    /// Bare names of the effective conda packages.
    ///
    /// Specs are assumed pre-validated at this point; a malformed spec
    /// string is a fatal error for the caller that built the list.
    pub fn conda_package_names(&self) -> Result<BTreeSet<String>, PackageSpecError> {
        self.conda_packages()
            .iter()
            .map(|spec| package::parse_conda_spec(spec).map(|parsed| parsed.name))
            .collect()
    }

    /// Bare names of the effective pip packages.
    pub fn pip_package_names(&self) -> Result<BTreeSet<String>, PackageSpecError> {
        self.pip_packages()
            .iter()
            .map(|spec| package::parse_pip_spec(spec).map(|parsed| parsed.name))
            .collect()
    }

    /// Filesystem path of the default env instantiated from this spec.
    pub fn env_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join("envs").join(self.name.as_str())
    }

    /// Line-oriented comparison against an older revision of the spec,
    /// sections ordered channels, conda, pip.
    ///
    /// Presentation only — equality questions go through
    /// [`channels_and_packages_hash`](Self::channels_and_packages_hash) or
    /// field comparison, never through this string.
    pub fn diff_from(&self, old: &EnvSpec) -> String {
        diff::render_spec_diff(old, self)
    }

    /// The spec's project-file section as a YAML value.
    ///
    /// Emits *own* values only — `packages` (with a trailing `{pip: [...]}`
    /// entry when own pip packages exist), `channels`, and the bare parent
    /// name under `inherit_from`. Inherited content is re-derived at load
    /// time through the parent reference, so baking it in here would force
    /// every child to be rewritten whenever a parent changes.
    pub fn to_yaml_value(&self) -> Value {
        let mut packages: Vec<Value> = self
            .conda_packages
            .iter()
            .map(|pkg| Value::String(pkg.clone()))
            .collect();
        if !self.pip_packages.is_empty() {
            let pip: Vec<Value> = self
                .pip_packages
                .iter()
                .map(|pkg| Value::String(pkg.clone()))
                .collect();
            let mut pip_entry = Mapping::new();
            pip_entry.insert(Value::String("pip".to_owned()), Value::Sequence(pip));
            packages.push(Value::Mapping(pip_entry));
        }

        let channels: Vec<Value> = self
            .channels
            .iter()
            .map(|channel| Value::String(channel.clone()))
            .collect();

        let mut result = Mapping::new();
        result.insert(Value::String("packages".to_owned()), Value::Sequence(packages));
        result.insert(Value::String("channels".to_owned()), Value::Sequence(channels));
        if let Some(parent_name) = &self.inherit_from_name {
            result.insert(
                Value::String("inherit_from".to_owned()),
                Value::String(parent_name.to_string()),
            );
        }
        Value::Mapping(result)
    }
}

/// Merge a parent's effective sequence with a spec's own sequence.
///
/// Parent entries keep their relative order, except that any entry also
/// present in `own` is dropped from the parent's position; the own entries
/// then follow in their declared order. Override-by-name wins and moves to
/// the end — deliberately not a stable in-place replace.
fn combine_keeping_last_duplicate(base: Vec<String>, own: &[String]) -> Vec<String> {
    let own_keys: HashSet<&str> = own.iter().map(String::as_str).collect();
    let mut combined: Vec<String> = base
        .into_iter()
        .filter(|item| !own_keys.contains(item.as_str()))
        .collect();
    combined.extend(own.iter().cloned());
    combined
}
