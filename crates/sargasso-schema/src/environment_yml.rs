//! Best-effort loading of conda `environment.yml` files.
//!
//! The description file is foreign input that may be malformed or
//! half-written, so extraction is lenient: every field degrades to a
//! default on a type mismatch, and entries of an unexpected shape are
//! skipped. Full validation happens downstream if the result is imported
//! into project configuration.

use crate::env_spec::EnvSpec;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

/// Load an environment-description file as an [`EnvSpec`], or `None` if it
/// could not be loaded.
///
/// `None` covers unreadable files, unparseable YAML, and documents whose
/// top level is not a mapping; callers treat it as "nothing to
/// synchronize", not as an error. The returned spec carries no inheritance
/// link.
pub fn load_environment_yml(path: impl AsRef<Path>) -> Option<EnvSpec> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).ok()?;
    let doc: Value = serde_yaml::from_str(&contents).ok()?;
    if !doc.is_mapping() {
        return None;
    }

    let name = string_field(&doc, "name")
        .or_else(|| string_field(&doc, "prefix").and_then(|prefix| base_name(Path::new(&prefix))))
        .or_else(|| base_name(path))?;

    let mut conda_packages = Vec::new();
    let mut pip_packages = Vec::new();
    if let Some(dependencies) = doc.get("dependencies").and_then(Value::as_sequence) {
        for dep in dependencies {
            if let Some(spec) = dep.as_str() {
                conda_packages.push(spec.to_owned());
            } else if let Some(pip) = dep.get("pip").and_then(Value::as_sequence) {
                pip_packages.extend(pip.iter().filter_map(Value::as_str).map(str::to_owned));
            }
            // any other shape is skipped, not an error
        }
    }

    let mut channels = Vec::new();
    if let Some(raw_channels) = doc.get("channels").and_then(Value::as_sequence) {
        channels.extend(raw_channels.iter().filter_map(Value::as_str).map(str::to_owned));
    }

    Some(EnvSpec::new(name, conda_packages, channels, pip_packages))
}

/// A non-empty string value for `key`, if the document has one.
fn string_field(doc: &Value, key: &str) -> Option<String> {
    doc.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn base_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}
