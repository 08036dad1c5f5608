//! Splitting package-spec strings into a bare name and constraint text.
//!
//! Understands just enough of the conda and pip spec grammars to recover
//! the package name; constraint text is carried verbatim, never resolved.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackageSpecError {
    #[error("invalid package specification: '{0}'")]
    Conda(String),
    #[error("invalid pip requirement: '{0}'")]
    Pip(String),
}

/// A package requirement split into its name and optional constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub constraint: Option<String>,
}

/// Parse a conda package spec such as `numpy`, `numpy=1.26`, or
/// `numpy=1.26=py312`.
///
/// The name ends at the first comparison character or whitespace; whatever
/// follows is kept as the constraint.
pub fn parse_conda_spec(spec: &str) -> Result<PackageSpec, PackageSpecError> {
    let trimmed = spec.trim();
    let (name, constraint) = split_name(trimmed, |c| {
        matches!(c, '=' | '<' | '>' | '!' | '~') || c.is_whitespace()
    });
    if name.is_empty() || !name.chars().all(is_name_char) {
        return Err(PackageSpecError::Conda(spec.to_owned()));
    }
    Ok(PackageSpec {
        name: name.to_owned(),
        constraint,
    })
}

/// Parse a pip requirement such as `flask`, `flask==2.0`,
/// `requests[socks]>=2.28`, or `pkg @ https://...`.
///
/// Besides comparison characters, the name also ends at extras (`[`),
/// environment markers (`;`), and direct references (`@`).
pub fn parse_pip_spec(spec: &str) -> Result<PackageSpec, PackageSpecError> {
    let trimmed = spec.trim();
    let (name, constraint) = split_name(trimmed, |c| {
        matches!(c, '=' | '<' | '>' | '!' | '~' | '[' | ';' | '@') || c.is_whitespace()
    });
    if name.is_empty() || !name.chars().all(is_name_char) {
        return Err(PackageSpecError::Pip(spec.to_owned()));
    }
    Ok(PackageSpec {
        name: name.to_owned(),
        constraint,
    })
}

fn split_name(spec: &str, terminator: impl Fn(char) -> bool) -> (&str, Option<String>) {
    let (name, rest) = match spec.find(terminator) {
        Some(at) => spec.split_at(at),
        None => (spec, ""),
    };
    let rest = rest.trim();
    let constraint = if rest.is_empty() {
        None
    } else {
        Some(rest.to_owned())
    };
    (name, constraint)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}
