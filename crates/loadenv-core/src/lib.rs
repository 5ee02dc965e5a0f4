//! LoadEnv Core - Domain types and errors
//!
//! This crate provides the foundational types shared by the LoadEnv gateway
//! and client crates: secret scopes, the redacting secret wrapper, full
//! secret records and the error taxonomy.

pub mod error;
pub mod secret;
pub mod types;

pub use error::{LoadEnvError, Result};
pub use secret::{SecretMetadataEntry, SecretRecord, SecretTag, SecretValue};
pub use types::{DEFAULT_ENVIRONMENT, DEFAULT_PATH, MachineIdentity, SecretScope};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
