//! Infisical gateway configuration.

use std::time::Duration;

use loadenv_core::{LoadEnvError, MachineIdentity, Result};

/// Infisical cloud endpoint.
pub const DEFAULT_HOST: &str = "https://app.infisical.com";

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Configuration for the Infisical gateway.
#[derive(Debug, Clone)]
pub struct InfisicalConfig {
    /// Base URL, without trailing slash.
    host: String,

    /// Default machine identity; calls without an override use it.
    credentials: Option<MachineIdentity>,

    /// Per-request timeout.
    timeout: Duration,
}

impl InfisicalConfig {
    /// Creates a new builder for InfisicalConfig.
    pub fn builder() -> InfisicalConfigBuilder {
        InfisicalConfigBuilder::default()
    }

    /// Returns the base URL.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the default machine identity.
    pub fn credentials(&self) -> Option<&MachineIdentity> {
        self.credentials.as_ref()
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds an API URL from a path starting with `/`.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }
}

/// Builder for InfisicalConfig.
#[derive(Debug, Default)]
pub struct InfisicalConfigBuilder {
    host: Option<String>,
    credentials: Option<MachineIdentity>,
    timeout: Option<Duration>,
}

impl InfisicalConfigBuilder {
    /// Sets the base URL.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the default machine identity from its parts.
    pub fn machine_identity(
        self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.credentials(MachineIdentity::new(client_id.into(), client_secret.into()))
    }

    /// Sets the default machine identity.
    pub fn credentials(mut self, credentials: MachineIdentity) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the host is not an http(s) URL or
    /// the timeout is zero.
    pub fn build(self) -> Result<InfisicalConfig> {
        let host = self
            .host
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        if !(host.starts_with("https://") || host.starts_with("http://")) {
            return Err(LoadEnvError::configuration(format!(
                "host must be an http(s) URL, got '{}'",
                host
            )));
        }

        let timeout = self.timeout.unwrap_or_else(default_timeout);
        if timeout.is_zero() {
            return Err(LoadEnvError::configuration("request timeout must be positive"));
        }

        Ok(InfisicalConfig {
            host,
            credentials: self.credentials,
            timeout,
        })
    }
}
