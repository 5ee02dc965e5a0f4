//! Cached secrets client.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use loadenv_core::{LoadEnvError, Result, SecretRecord, SecretScope, SecretValue};
use loadenv_gateway::{InfisicalGateway, ListOptions, NewSecret, SecretGateway, SecretUpdate};
use tracing::{debug, error, info};

use crate::cache::{CacheKey, CacheStats, Clock, InvalidationResult, SystemClock, TtlCache};
use crate::query::SecretQuery;
use crate::settings::ClientSettings;

/// Cached value: a single secret or the full snapshot of a scope.
#[derive(Debug, Clone)]
pub enum CachedSecrets {
    Single(SecretValue),
    All(IndexMap<String, SecretValue>),
}

/// Secrets client with a read-through cache in front of a
/// [`SecretGateway`].
///
/// Reads (`get`, `get_all`) are served from the cache while the entry is
/// fresh. Writes go straight to the gateway and, on success, drop every
/// cached entry of the affected scope. Listing and lookups by name always
/// hit the gateway.
///
/// The client is `Send + Sync`; build it once and share it behind an `Arc`.
///
/// Cache and gateway metrics go through the `metrics` facade. Hosts that
/// export them install a recorder and then call
/// [`register_metrics`](crate::metrics::register_metrics) once to publish
/// their descriptions.
///
/// # Examples
///
/// ```no_run
/// use loadenv_client::{ClientSettings, SecretQuery, SecretsClient};
///
/// # async fn run() -> loadenv_core::Result<()> {
/// let settings = ClientSettings::builder()
///     .machine_identity("client-id", "client-secret")
///     .default_project("proj-123")
///     .build()?;
/// let client = SecretsClient::from_settings(settings)?;
///
/// let url = client.get("DATABASE_URL", &SecretQuery::new()).await?;
/// println!("{}", url); // prints **********
/// # Ok(())
/// # }
/// ```
pub struct SecretsClient {
    gateway: Arc<dyn SecretGateway>,
    cache: TtlCache<CacheKey, CachedSecrets>,
    settings: ClientSettings,
}

impl SecretsClient {
    /// Creates a client backed by the Infisical gateway.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the gateway settings are invalid.
    pub fn from_settings(settings: ClientSettings) -> Result<Self> {
        let gateway = InfisicalGateway::new(settings.gateway_config()?)?;
        Ok(Self::with_gateway(settings, Arc::new(gateway)))
    }

    /// Creates a client from `INFISICAL_*` variables and `./.env`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the settings cannot be loaded.
    pub fn from_env() -> Result<Self> {
        Self::from_settings(ClientSettings::builder().load()?)
    }

    /// Creates a client backed by the given gateway.
    pub fn with_gateway(settings: ClientSettings, gateway: Arc<dyn SecretGateway>) -> Self {
        Self::with_gateway_and_clock(settings, gateway, Arc::new(SystemClock))
    }

    /// Creates a client backed by the given gateway whose cache reads time
    /// from `clock`.
    pub fn with_gateway_and_clock(
        settings: ClientSettings,
        gateway: Arc<dyn SecretGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = TtlCache::with_clock(settings.cache_config(), clock);

        info!(
            gateway = %gateway.name(),
            ttl_secs = settings.cache_ttl().as_secs(),
            max_entries = settings.cache_max_entries(),
            "Secrets client initialized"
        );

        Self {
            gateway,
            cache,
            settings,
        }
    }

    /// Returns the settings.
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Returns cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Resolves a query against the defaults. Fails before any network
    /// call when no project is known.
    fn resolve_scope(&self, query: &SecretQuery) -> Result<SecretScope> {
        let project = query
            .project_id()
            .filter(|p| !p.is_empty())
            .or(self.settings.default_project())
            .ok_or_else(|| {
                LoadEnvError::configuration(
                    "project id is required; pass it in the query or set INFISICAL_PROJECT_ID",
                )
            })?;

        let environment = query
            .environment_slug()
            .filter(|e| !e.is_empty())
            .unwrap_or(self.settings.default_environment());

        let path = query
            .secret_path()
            .filter(|p| !p.is_empty())
            .unwrap_or(self.settings.default_path());

        Ok(SecretScope::new(project, environment, path))
    }

    async fn call_gateway<T, F>(&self, operation: &'static str, scope: &SecretScope, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        info!(operation, scope = %scope, gateway = %self.gateway.name(), "Calling secret service");

        let start = Instant::now();
        let result = call.await;
        let elapsed = start.elapsed();
        self.cache
            .metrics()
            .record_gateway_call(operation, result.is_ok(), elapsed);

        match &result {
            Ok(_) => info!(
                operation,
                scope = %scope,
                elapsed_ms = elapsed.as_millis() as u64,
                "Secret service call succeeded"
            ),
            Err(e) => error!(operation, scope = %scope, error = %e, "Secret service call failed"),
        }

        result
    }

    /// Returns one secret value, from the cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no project can be resolved, and
    /// any gateway error unchanged. Errors never touch the cache.
    pub async fn get(&self, name: &str, query: &SecretQuery) -> Result<SecretValue> {
        let scope = self.resolve_scope(query)?;
        let key = CacheKey::secret(&scope, name);

        if let Some(CachedSecrets::Single(value)) = self.cache.get(&key) {
            debug!(key = %key, "Secret served from cache");
            return Ok(value);
        }
        debug!(key = %key, "Secret not cached");

        let value = self
            .call_gateway(
                "fetch_secret",
                &scope,
                self.gateway
                    .fetch_secret(name, &scope, query.identity_override()),
            )
            .await?;

        self.cache.insert(key, CachedSecrets::Single(value.clone()));
        Ok(value)
    }

    /// Returns every secret of a scope, from the cache when fresh.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn get_all(&self, query: &SecretQuery) -> Result<IndexMap<String, SecretValue>> {
        let scope = self.resolve_scope(query)?;
        let key = CacheKey::all(&scope);

        if let Some(CachedSecrets::All(secrets)) = self.cache.get(&key) {
            debug!(key = %key, count = secrets.len(), "Secrets served from cache");
            return Ok(secrets);
        }
        debug!(key = %key, "Secrets not cached");

        let secrets = self
            .call_gateway(
                "fetch_all_secrets",
                &scope,
                self.gateway
                    .fetch_all_secrets(&scope, query.identity_override()),
            )
            .await?;

        self.cache.insert(key, CachedSecrets::All(secrets.clone()));
        Ok(secrets)
    }

    /// Lists secret records with their metadata. Never cached.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn list_secrets(
        &self,
        query: &SecretQuery,
        options: &ListOptions,
    ) -> Result<Vec<SecretRecord>> {
        let scope = self.resolve_scope(query)?;
        self.call_gateway(
            "list_secrets",
            &scope,
            self.gateway
                .list_secrets(&scope, options, query.identity_override()),
        )
        .await
    }

    /// Returns the full record of one secret. Never cached.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn secret_by_name(&self, name: &str, query: &SecretQuery) -> Result<SecretRecord> {
        let scope = self.resolve_scope(query)?;
        self.call_gateway(
            "get_secret_by_name",
            &scope,
            self.gateway
                .get_secret_by_name(name, &scope, query.identity_override()),
        )
        .await
    }

    /// Creates a secret, then drops every cached entry of its scope.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get). A failed write leaves the cache as is.
    pub async fn create_secret(&self, secret: &NewSecret, query: &SecretQuery) -> Result<SecretRecord> {
        let scope = self.resolve_scope(query)?;
        let record = self
            .call_gateway(
                "create_secret",
                &scope,
                self.gateway
                    .create_secret(secret, &scope, query.identity_override()),
            )
            .await?;

        self.invalidate_after_write(&scope);
        Ok(record)
    }

    /// Updates (and possibly renames) a secret, then drops every cached
    /// entry of its scope.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get). A failed write leaves the cache as is.
    pub async fn update_secret(&self, update: &SecretUpdate, query: &SecretQuery) -> Result<()> {
        let scope = self.resolve_scope(query)?;
        self.call_gateway(
            "update_secret",
            &scope,
            self.gateway
                .update_secret(update, &scope, query.identity_override()),
        )
        .await?;

        self.invalidate_after_write(&scope);
        Ok(())
    }

    // Values may embed references to other secrets of the scope, so the
    // whole scope goes, not just the written names.
    fn invalidate_after_write(&self, scope: &SecretScope) {
        let result = self
            .cache
            .invalidate_scope(scope.project(), scope.environment(), scope.path());
        debug!(scope = %scope, count = result.count, "Dropped cached entries after write");
    }

    /// Drops the cached value of one secret. Returns true if it was cached.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no project can be resolved.
    pub fn invalidate(&self, name: &str, query: &SecretQuery) -> Result<bool> {
        let scope = self.resolve_scope(query)?;
        Ok(self.cache.invalidate(&CacheKey::secret(&scope, name)))
    }

    /// Drops every cached entry of a scope.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no project can be resolved.
    pub fn invalidate_scope(&self, query: &SecretQuery) -> Result<InvalidationResult> {
        let scope = self.resolve_scope(query)?;
        Ok(self
            .cache
            .invalidate_scope(scope.project(), scope.environment(), scope.path()))
    }

    /// Drops cached entries whose `project:environment:path:name` form
    /// matches a glob pattern.
    pub fn invalidate_matching(&self, pattern: &str) -> InvalidationResult {
        self.cache.invalidate_by_pattern(pattern)
    }

    /// Drops every cached entry. Returns how many there were.
    pub fn clear_cache(&self) -> usize {
        let count = self.cache.invalidate_all();
        info!(count, "Secrets cache cleared");
        count
    }
}

impl std::fmt::Debug for SecretsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsClient")
            .field("gateway", &self.gateway.name())
            .field("cache", &self.cache)
            .field("settings", &self.settings)
            .finish()
    }
}
