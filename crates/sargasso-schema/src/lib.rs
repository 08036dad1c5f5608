//! Env spec model and parsing for Sargasso.
//!
//! This crate defines the schema layer: the inheritable environment spec
//! (`EnvSpec`) with its combine-keeping-last-duplicate merge, deterministic
//! content hashing over the effective package and channel lists, line-diff
//! rendering, package-spec name extraction, and best-effort loading of
//! external `environment.yml` files.

mod diff;
pub mod env_spec;
pub mod environment_yml;
pub mod package;
pub mod types;

pub use env_spec::EnvSpec;
pub use environment_yml::load_environment_yml;
pub use package::{parse_conda_spec, parse_pip_spec, PackageSpec, PackageSpecError};
pub use types::{SpecHash, SpecName};
