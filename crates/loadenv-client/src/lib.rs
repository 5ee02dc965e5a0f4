//! LoadEnv Client - cached access to secrets stored in Infisical.
//!
//! The [`SecretsClient`] resolves each call to a scope (project,
//! environment, path), serves reads from a bounded TTL cache and forwards
//! misses and writes to a [`SecretGateway`](loadenv_gateway::SecretGateway).

pub mod cache;
pub mod client;
pub mod metrics;
pub mod query;
pub mod settings;
pub mod telemetry;

pub use client::{CachedSecrets, SecretsClient};
pub use query::SecretQuery;
pub use settings::{ClientSettings, ClientSettingsBuilder};

pub use loadenv_core::{LoadEnvError, Result, SecretRecord, SecretValue};
pub use loadenv_gateway::{ListOptions, NewSecret, SecretUpdate};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }
}
