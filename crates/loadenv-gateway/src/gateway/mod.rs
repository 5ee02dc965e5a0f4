//! Secret-service gateway abstraction.
//!
//! This module defines the trait every remote secret backend implements and
//! the option structures its write and list operations take.

mod request;
mod traits;

pub use request::{ListOptions, NewSecret, SecretUpdate};
pub use traits::SecretGateway;
