//! Client settings.
//!
//! Settings are layered, highest precedence first: explicit builder
//! arguments, the process environment (`INFISICAL_*`), a `.env` file, and
//! built-in defaults.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigBuilder, Environment, builder::DefaultState};
use loadenv_core::{DEFAULT_ENVIRONMENT, DEFAULT_PATH, LoadEnvError, MachineIdentity, Result};
use loadenv_gateway::{DEFAULT_HOST, InfisicalConfig};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::cache::CacheConfig;

/// Prefix of the recognized environment variables.
pub const ENV_PREFIX: &str = "INFISICAL";

const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
const DEFAULT_CACHE_MAX_ENTRIES: usize = 100;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shape of the merged sources. Field names are the environment variable
/// names without the `INFISICAL_` prefix.
#[derive(Debug, Deserialize)]
struct RawSettings {
    machine_id: Option<String>,
    secret_key: Option<String>,
    host: String,
    project_id: Option<String>,
    environment: String,
    secret_path: String,
    cache_ttl_secs: u64,
    cache_max_entries: usize,
    request_timeout_secs: u64,
}

/// Resolved settings for a [`SecretsClient`](crate::SecretsClient).
#[derive(Debug, Clone)]
pub struct ClientSettings {
    credentials: Option<MachineIdentity>,
    host: String,
    default_project: Option<String>,
    default_environment: String,
    default_path: String,
    cache_ttl: Duration,
    cache_max_entries: usize,
    request_timeout: Duration,
}

impl ClientSettings {
    /// Creates a new builder for ClientSettings.
    pub fn builder() -> ClientSettingsBuilder {
        ClientSettingsBuilder::default()
    }

    /// Returns the default machine identity.
    pub fn credentials(&self) -> Option<&MachineIdentity> {
        self.credentials.as_ref()
    }

    /// Returns the secret service base URL.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the project used when a query names none.
    pub fn default_project(&self) -> Option<&str> {
        self.default_project.as_deref()
    }

    /// Returns the environment used when a query names none.
    pub fn default_environment(&self) -> &str {
        &self.default_environment
    }

    /// Returns the path used when a query names none.
    pub fn default_path(&self) -> &str {
        &self.default_path
    }

    /// Returns the cache entry lifetime.
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Returns the cache capacity.
    pub fn cache_max_entries(&self) -> usize {
        self.cache_max_entries
    }

    /// Returns the per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the cache configuration derived from these settings.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: self.cache_ttl,
            max_entries: self.cache_max_entries,
        }
    }

    /// Returns the Infisical gateway configuration derived from these settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the host is not a valid URL.
    pub fn gateway_config(&self) -> Result<InfisicalConfig> {
        let mut builder = InfisicalConfig::builder()
            .host(&self.host)
            .timeout(self.request_timeout);
        if let Some(credentials) = &self.credentials {
            builder = builder.credentials(credentials.clone());
        }
        builder.build()
    }
}

/// Builder for ClientSettings.
#[derive(Debug, Default)]
pub struct ClientSettingsBuilder {
    machine_identity_id: Option<String>,
    machine_identity_secret: Option<String>,
    host: Option<String>,
    default_project: Option<String>,
    default_environment: Option<String>,
    default_path: Option<String>,
    cache_ttl: Option<Duration>,
    cache_max_entries: Option<usize>,
    request_timeout: Option<Duration>,
    env_file: Option<PathBuf>,
}

impl ClientSettingsBuilder {
    /// Sets the machine identity used for every call without an override.
    pub fn machine_identity(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.machine_identity_id = Some(id.into());
        self.machine_identity_secret = Some(secret.into());
        self
    }

    /// Sets the secret service base URL.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the default project.
    pub fn default_project(mut self, project: impl Into<String>) -> Self {
        self.default_project = Some(project.into());
        self
    }

    /// Sets the default environment.
    pub fn default_environment(mut self, environment: impl Into<String>) -> Self {
        self.default_environment = Some(environment.into());
        self
    }

    /// Sets the default secret path.
    pub fn default_path(mut self, path: impl Into<String>) -> Self {
        self.default_path = Some(path.into());
        self
    }

    /// Sets the cache entry lifetime. Whole seconds are kept.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Sets the cache capacity.
    pub fn cache_max_entries(mut self, max_entries: usize) -> Self {
        self.cache_max_entries = Some(max_entries);
        self
    }

    /// Sets the per-request timeout. Whole seconds are kept.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Reads this file instead of `./.env` when loading from the environment.
    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Builds the settings from explicit arguments and defaults only.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a value is invalid.
    pub fn build(self) -> Result<ClientSettings> {
        self.assemble(Vec::new())
    }

    /// Builds the settings from explicit arguments, the process
    /// environment, the `.env` file and defaults.
    ///
    /// A missing `./.env` is ignored; a missing file set with
    /// [`env_file`](Self::env_file) is an error. The file never overrides
    /// variables already present in the process environment, and the
    /// process environment itself is not modified.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the env file cannot be read or a
    /// value is invalid.
    pub fn load(self) -> Result<ClientSettings> {
        let file_vars = self.read_env_file()?;
        let sources = vec![env_source(Some(file_vars)), env_source(None)];
        self.assemble(sources)
    }

    /// Builds the settings from explicit arguments, the given variables
    /// (named as in the process environment, e.g. `INFISICAL_PROJECT_ID`)
    /// and defaults. The process environment is not read.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a value is invalid.
    pub fn load_from_vars<I, K, V>(self, vars: I) -> Result<ClientSettings>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.assemble(vec![env_source(Some(vars))])
    }

    fn read_env_file(&self) -> Result<HashMap<String, String>> {
        let iter = match &self.env_file {
            Some(path) => Some(dotenvy::from_path_iter(path).map_err(|e| {
                LoadEnvError::configuration(format!(
                    "failed to read env file {}: {}",
                    path.display(),
                    e
                ))
            })?),
            None => dotenvy::dotenv_iter().ok(),
        };

        let mut vars = HashMap::new();
        if let Some(iter) = iter {
            for item in iter {
                let (key, value) = item.map_err(|e| {
                    LoadEnvError::configuration(format!("invalid env file entry: {}", e))
                })?;
                vars.insert(key, value);
            }
            debug!(count = vars.len(), "Loaded variables from env file");
        }
        Ok(vars)
    }

    fn assemble(self, sources: Vec<Environment>) -> Result<ClientSettings> {
        let mut builder = defaults().map_err(config_error)?;
        for source in sources {
            builder = builder.add_source(source);
        }

        let builder = builder
            .set_override_option("machine_id", self.machine_identity_id)
            .and_then(|b| b.set_override_option("secret_key", self.machine_identity_secret))
            .and_then(|b| b.set_override_option("host", self.host))
            .and_then(|b| b.set_override_option("project_id", self.default_project))
            .and_then(|b| b.set_override_option("environment", self.default_environment))
            .and_then(|b| b.set_override_option("secret_path", self.default_path))
            .and_then(|b| {
                b.set_override_option("cache_ttl_secs", self.cache_ttl.map(|d| d.as_secs()))
            })
            .and_then(|b| {
                b.set_override_option(
                    "cache_max_entries",
                    self.cache_max_entries.map(|n| n as u64),
                )
            })
            .and_then(|b| {
                b.set_override_option(
                    "request_timeout_secs",
                    self.request_timeout.map(|d| d.as_secs()),
                )
            })
            .map_err(config_error)?;

        let raw = builder
            .build()
            .and_then(Config::try_deserialize::<RawSettings>)
            .map_err(config_error)?;

        ClientSettings::try_from(raw)
    }
}

fn defaults() -> std::result::Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    Config::builder()
        .set_default("host", DEFAULT_HOST)?
        .set_default("environment", DEFAULT_ENVIRONMENT)?
        .set_default("secret_path", DEFAULT_PATH)?
        .set_default("cache_ttl_secs", DEFAULT_CACHE_TTL_SECS)?
        .set_default("cache_max_entries", DEFAULT_CACHE_MAX_ENTRIES as u64)?
        .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)
}

fn env_source(vars: Option<HashMap<String, String>>) -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .ignore_empty(true)
        .source(vars.map(|vars| vars.into_iter().collect()))
}

fn config_error(err: config::ConfigError) -> LoadEnvError {
    LoadEnvError::configuration(format!("invalid client settings: {}", err))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<RawSettings> for ClientSettings {
    type Error = LoadEnvError;

    fn try_from(raw: RawSettings) -> Result<Self> {
        let credentials = match (non_empty(raw.machine_id), non_empty(raw.secret_key)) {
            (Some(id), Some(secret)) => Some(MachineIdentity::new(id, secret)),
            (None, None) => None,
            (Some(_), None) | (None, Some(_)) => {
                warn!("Only one of the machine identity id and secret is set; ignoring both");
                None
            },
        };

        let environment = raw.environment.trim().to_string();
        if environment.is_empty() {
            return Err(LoadEnvError::configuration("default environment must not be empty"));
        }

        if raw.cache_max_entries == 0 {
            return Err(LoadEnvError::configuration("cache_max_entries must be at least 1"));
        }

        if raw.request_timeout_secs == 0 {
            return Err(LoadEnvError::configuration("request_timeout_secs must be at least 1"));
        }

        let default_path = if raw.secret_path.trim().is_empty() {
            DEFAULT_PATH.to_string()
        } else {
            raw.secret_path
        };

        Ok(Self {
            credentials,
            host: raw.host,
            default_project: non_empty(raw.project_id),
            default_environment: environment,
            default_path,
            cache_ttl: Duration::from_secs(raw.cache_ttl_secs),
            cache_max_entries: raw.cache_max_entries,
            request_timeout: Duration::from_secs(raw.request_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ClientSettings::builder().build().unwrap();

        assert!(settings.credentials().is_none());
        assert_eq!(settings.host(), DEFAULT_HOST);
        assert_eq!(settings.default_project(), None);
        assert_eq!(settings.default_environment(), "dev");
        assert_eq!(settings.default_path(), "/");
        assert_eq!(settings.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(settings.cache_max_entries(), 100);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_explicit_values() {
        let settings = ClientSettings::builder()
            .machine_identity("id", "secret")
            .host("https://secrets.internal")
            .default_project("proj")
            .default_environment("prod")
            .default_path("/api")
            .cache_ttl(Duration::from_secs(60))
            .cache_max_entries(5)
            .build()
            .unwrap();

        let credentials = settings.credentials().unwrap();
        assert_eq!(credentials.client_id(), "id");
        assert_eq!(credentials.client_secret().expose(), "secret");
        assert_eq!(settings.host(), "https://secrets.internal");
        assert_eq!(settings.default_project(), Some("proj"));
        assert_eq!(settings.default_environment(), "prod");
        assert_eq!(settings.default_path(), "/api");
        assert_eq!(settings.cache_config().ttl, Duration::from_secs(60));
        assert_eq!(settings.cache_config().max_entries, 5);
    }

    #[test]
    fn test_vars_are_read() {
        let settings = ClientSettings::builder()
            .load_from_vars([
                ("INFISICAL_MACHINE_ID", "env-id"),
                ("INFISICAL_SECRET_KEY", "env-secret"),
                ("INFISICAL_PROJECT_ID", "env-proj"),
                ("INFISICAL_ENVIRONMENT", "staging"),
                ("INFISICAL_SECRET_PATH", "/svc"),
                ("INFISICAL_CACHE_TTL_SECS", "120"),
                ("INFISICAL_CACHE_MAX_ENTRIES", "7"),
                ("INFISICAL_REQUEST_TIMEOUT_SECS", "5"),
            ])
            .unwrap();

        assert_eq!(settings.credentials().unwrap().client_id(), "env-id");
        assert_eq!(settings.default_project(), Some("env-proj"));
        assert_eq!(settings.default_environment(), "staging");
        assert_eq!(settings.default_path(), "/svc");
        assert_eq!(settings.cache_ttl(), Duration::from_secs(120));
        assert_eq!(settings.cache_max_entries(), 7);
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_explicit_values_win_over_vars() {
        let settings = ClientSettings::builder()
            .default_project("explicit")
            .load_from_vars([
                ("INFISICAL_PROJECT_ID", "env-proj"),
                ("INFISICAL_ENVIRONMENT", "staging"),
            ])
            .unwrap();

        assert_eq!(settings.default_project(), Some("explicit"));
        assert_eq!(settings.default_environment(), "staging");
    }

    #[test]
    fn test_empty_vars_fall_back_to_defaults() {
        let settings = ClientSettings::builder()
            .load_from_vars([("INFISICAL_ENVIRONMENT", ""), ("INFISICAL_PROJECT_ID", "")])
            .unwrap();

        assert_eq!(settings.default_environment(), "dev");
        assert_eq!(settings.default_project(), None);
    }

    #[test]
    fn test_half_configured_identity_is_ignored() {
        let settings = ClientSettings::builder()
            .load_from_vars([("INFISICAL_MACHINE_ID", "only-id")])
            .unwrap();

        assert!(settings.credentials().is_none());
    }

    #[test]
    fn test_invalid_number_is_configuration_error() {
        let err = ClientSettings::builder()
            .load_from_vars([("INFISICAL_CACHE_TTL_SECS", "soon")])
            .unwrap_err();

        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let err = ClientSettings::builder()
            .cache_max_entries(0)
            .build()
            .unwrap_err();

        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_gateway_config() {
        let settings = ClientSettings::builder()
            .host("https://secrets.internal/")
            .machine_identity("id", "secret")
            .request_timeout(Duration::from_secs(9))
            .build()
            .unwrap();

        let config = settings.gateway_config().unwrap();
        assert_eq!(config.host(), "https://secrets.internal");
        assert_eq!(config.timeout(), Duration::from_secs(9));
        assert_eq!(config.credentials().unwrap().client_id(), "id");
    }

    #[test]
    fn test_invalid_host_fails_gateway_config() {
        let settings = ClientSettings::builder().host("ftp://nope").build().unwrap();

        assert!(settings.gateway_config().unwrap_err().is_configuration_error());
    }
}
