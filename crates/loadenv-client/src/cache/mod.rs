//! Cache module for the LoadEnv secrets client.
//!
//! This module provides a bounded, in-process cache with per-entry TTL,
//! least-recently-used eviction, scope and pattern invalidation, and
//! metrics.

pub mod clock;
pub mod invalidation;
pub mod keys;
pub mod ttl_cache;

// Re-exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use invalidation::InvalidationResult;
pub use keys::{CacheKey, SecretSelector};
pub use ttl_cache::{CacheConfig, CacheStats, TtlCache};
