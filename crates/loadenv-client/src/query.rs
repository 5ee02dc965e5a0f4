//! Per-call scope and credential overrides.

use loadenv_core::MachineIdentity;

/// Where a call looks for secrets, and with which identity.
///
/// Anything left unset falls back to the client settings. Credentials never
/// take part in cache keys, so callers with different identities share
/// cached values for the same scope.
///
/// # Examples
///
/// ```
/// use loadenv_client::SecretQuery;
///
/// let query = SecretQuery::new()
///     .project("proj-123")
///     .environment("prod")
///     .path("/api");
/// assert_eq!(query.project_id(), Some("proj-123"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SecretQuery {
    project: Option<String>,
    environment: Option<String>,
    path: Option<String>,
    credentials: Option<MachineIdentity>,
}

impl SecretQuery {
    /// Creates a query that uses every default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project.
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Sets the environment.
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Sets the secret path. Empty means the default path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Uses this machine identity instead of the default one.
    pub fn credentials(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.credentials = Some(MachineIdentity::new(id.into(), secret.into()));
        self
    }

    /// Uses this machine identity instead of the default one.
    pub fn identity(mut self, identity: MachineIdentity) -> Self {
        self.credentials = Some(identity);
        self
    }

    /// Returns the requested project, if any.
    pub fn project_id(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Returns the requested environment, if any.
    pub fn environment_slug(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Returns the requested path, if any.
    pub fn secret_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the identity override, if any.
    pub fn identity_override(&self) -> Option<&MachineIdentity> {
        self.credentials.as_ref()
    }
}
