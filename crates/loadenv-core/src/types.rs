//! Common type definitions for LoadEnv.

use std::fmt;

use crate::secret::SecretValue;

/// Environment used when neither the call nor the settings name one.
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Secret path used when neither the call nor the settings name one.
pub const DEFAULT_PATH: &str = "/";

/// Fully resolved coordinates of a group of secrets.
///
/// A scope is what the remote service calls a folder: a path inside one
/// environment of one project.
///
/// # Example
///
/// ```
/// use loadenv_core::SecretScope;
///
/// let scope = SecretScope::new("proj-123", "prod", "backend/");
/// assert_eq!(scope.project(), "proj-123");
/// assert_eq!(scope.path(), "/backend");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretScope {
    project: String,
    environment: String,
    path: String,
}

impl SecretScope {
    /// Creates a new scope, normalizing the path.
    pub fn new(
        project: impl Into<String>,
        environment: impl Into<String>,
        path: impl AsRef<str>,
    ) -> Self {
        Self {
            project: project.into(),
            environment: environment.into(),
            path: Self::normalize_path(path.as_ref()),
        }
    }

    /// Returns the project identifier.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Returns the environment slug.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Returns the normalized secret path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Normalizes a secret path: leading `/`, no trailing `/`, empty means root.
    ///
    /// ```
    /// use loadenv_core::SecretScope;
    ///
    /// assert_eq!(SecretScope::normalize_path(""), "/");
    /// assert_eq!(SecretScope::normalize_path("app/db/"), "/app/db");
    /// assert_eq!(SecretScope::normalize_path("/"), "/");
    /// ```
    pub fn normalize_path(path: &str) -> String {
        let trimmed = path.trim().trim_matches('/');
        if trimmed.is_empty() {
            DEFAULT_PATH.to_string()
        } else {
            format!("/{}", trimmed)
        }
    }
}

impl fmt::Display for SecretScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.project, self.environment, self.path)
    }
}

/// Machine identity credentials (universal auth client id and secret).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineIdentity {
    client_id: String,
    client_secret: SecretValue,
}

impl MachineIdentity {
    /// Creates a new credential pair.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<SecretValue>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Returns the client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the client secret (still wrapped).
    pub fn client_secret(&self) -> &SecretValue {
        &self.client_secret
    }
}
