//! # LoadEnv Gateway
//!
//! Remote secret-service access for LoadEnv.
//!
//! This crate defines the [`SecretGateway`] trait the client talks to and an
//! implementation of it backed by the Infisical REST API.
//!
//! ## Features
//!
//! - Async trait-based gateway abstraction
//! - Universal-auth (machine identity) login with per-identity token reuse
//! - Per-call credential overrides
//! - Explicit option structures for listing, creating and updating secrets
//!
//! ## Example
//!
//! ```ignore
//! use loadenv_core::SecretScope;
//! use loadenv_gateway::{InfisicalConfig, InfisicalGateway, SecretGateway};
//!
//! let config = InfisicalConfig::builder()
//!     .machine_identity("client-id", "client-secret")
//!     .build()?;
//!
//! let gateway = InfisicalGateway::new(config)?;
//!
//! let scope = SecretScope::new("proj-123", "dev", "/");
//! let value = gateway.fetch_secret("DATABASE_URL", &scope, None).await?;
//! ```

pub mod gateway;
pub mod infisical;

// Re-exports
pub use gateway::{ListOptions, NewSecret, SecretGateway, SecretUpdate};
pub use infisical::{DEFAULT_HOST, InfisicalConfig, InfisicalConfigBuilder, InfisicalGateway};

// Re-export loadenv_core for consumers
pub use loadenv_core;
