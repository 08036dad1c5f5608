//! Project-side reconciliation for Sargasso env specs.
//!
//! This crate ties the schema layer to a project's collection of specs:
//! resolving `inherit_from` links across the collection (with cycle
//! detection), and checking externally authored `environment.yml` files
//! for drift against what the project already records.
//!
//! Nothing here installs packages or touches environments on disk; the
//! output is always a resolved spec collection or an out-of-sync
//! candidate for the caller to act on.

pub mod resolve;
pub mod sync;

pub use resolve::{resolve_env_specs, RawEnvSpec, Resolution, ResolveProblem};
pub use sync::{
    find_out_of_sync_environment_file, find_out_of_sync_spec, OutOfSyncSpec, ENVIRONMENT_FILENAMES,
};
