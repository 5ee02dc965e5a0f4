#![allow(dead_code)]
//! In-memory gateway that counts calls, for client integration tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use loadenv_client::cache::ManualClock;
use loadenv_client::{ClientSettings, SecretsClient};
use loadenv_core::{LoadEnvError, MachineIdentity, Result, SecretRecord, SecretScope, SecretValue};
use loadenv_gateway::{ListOptions, NewSecret, SecretGateway, SecretUpdate};
use parking_lot::Mutex;
use serde_json::json;

pub const PROJECT: &str = "proj-123";

type ScopeKey = (String, String, String);

fn scope_key(scope: &SecretScope) -> ScopeKey {
    (
        scope.project().to_string(),
        scope.environment().to_string(),
        scope.path().to_string(),
    )
}

fn record(scope: &SecretScope, name: &str, value: &str) -> SecretRecord {
    serde_json::from_value(json!({
        "id": format!("id-{}", name),
        "workspace": scope.project(),
        "environment": scope.environment(),
        "secretPath": scope.path(),
        "version": 1,
        "secretKey": name,
        "secretValue": value,
    }))
    .expect("valid record fixture")
}

/// Gateway backed by an in-memory store.
#[derive(Default)]
pub struct MockGateway {
    store: Mutex<HashMap<ScopeKey, IndexMap<String, String>>>,
    failure: Mutex<Option<fn() -> LoadEnvError>>,
    delay: Mutex<Option<Duration>>,
    seen_identities: Mutex<Vec<Option<String>>>,
    pub fetches: AtomicUsize,
    pub snapshot_fetches: AtomicUsize,
    pub lists: AtomicUsize,
    pub lookups: AtomicUsize,
    pub writes: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Stores a value as if it existed remotely.
    pub fn seed(&self, scope: &SecretScope, name: &str, value: &str) {
        self.store
            .lock()
            .entry(scope_key(scope))
            .or_default()
            .insert(name.to_string(), value.to_string());
    }

    /// Makes every following call fail with the given error.
    pub fn fail_with(&self, error: fn() -> LoadEnvError) {
        *self.failure.lock() = Some(error);
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// Delays every following call.
    pub fn delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn seen_identities(&self) -> Vec<Option<String>> {
        self.seen_identities.lock().clone()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn enter(&self, counter: &AtomicUsize, credentials: Option<&MachineIdentity>) -> Result<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        self.seen_identities
            .lock()
            .push(credentials.map(|c| c.client_id().to_string()));

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = *self.failure.lock();
        match failure {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }

    fn lookup(&self, name: &str, scope: &SecretScope) -> Result<String> {
        self.store
            .lock()
            .get(&scope_key(scope))
            .and_then(|secrets| secrets.get(name).cloned())
            .ok_or_else(|| LoadEnvError::not_found(format!("secret '{}' in {}", name, scope)))
    }
}

#[async_trait]
impl SecretGateway for MockGateway {
    async fn fetch_secret(
        &self,
        name: &str,
        scope: &SecretScope,
        credentials: Option<&MachineIdentity>,
    ) -> Result<SecretValue> {
        self.enter(&self.fetches, credentials).await?;
        self.lookup(name, scope).map(SecretValue::new)
    }

    async fn fetch_all_secrets(
        &self,
        scope: &SecretScope,
        credentials: Option<&MachineIdentity>,
    ) -> Result<IndexMap<String, SecretValue>> {
        self.enter(&self.snapshot_fetches, credentials).await?;
        Ok(self
            .store
            .lock()
            .get(&scope_key(scope))
            .map(|secrets| {
                secrets
                    .iter()
                    .map(|(k, v)| (k.clone(), SecretValue::new(v.as_str())))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_secrets(
        &self,
        scope: &SecretScope,
        _options: &ListOptions,
        credentials: Option<&MachineIdentity>,
    ) -> Result<Vec<SecretRecord>> {
        self.enter(&self.lists, credentials).await?;
        Ok(self
            .store
            .lock()
            .get(&scope_key(scope))
            .map(|secrets| {
                secrets
                    .iter()
                    .map(|(k, v)| record(scope, k, v))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_secret(
        &self,
        secret: &NewSecret,
        scope: &SecretScope,
        credentials: Option<&MachineIdentity>,
    ) -> Result<SecretRecord> {
        self.enter(&self.writes, credentials).await?;
        self.seed(scope, secret.name(), secret.value().expose());
        Ok(record(scope, secret.name(), secret.value().expose()))
    }

    async fn update_secret(
        &self,
        update: &SecretUpdate,
        scope: &SecretScope,
        credentials: Option<&MachineIdentity>,
    ) -> Result<()> {
        self.enter(&self.writes, credentials).await?;
        let current = self.lookup(update.current_name(), scope)?;

        let mut store = self.store.lock();
        let secrets = store.entry(scope_key(scope)).or_default();
        let value = update
            .new_value()
            .map(|v| v.expose().to_string())
            .unwrap_or(current);
        let name = update.new_name().unwrap_or(update.current_name()).to_string();

        secrets.shift_remove(update.current_name());
        secrets.insert(name, value);
        Ok(())
    }

    async fn get_secret_by_name(
        &self,
        name: &str,
        scope: &SecretScope,
        credentials: Option<&MachineIdentity>,
    ) -> Result<SecretRecord> {
        self.enter(&self.lookups, credentials).await?;
        let value = self.lookup(name, scope)?;
        Ok(record(scope, name, &value))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub fn settings() -> ClientSettings {
    ClientSettings::builder()
        .machine_identity("default-id", "default-secret")
        .default_project(PROJECT)
        .cache_ttl(Duration::from_secs(3600))
        .cache_max_entries(100)
        .build()
        .expect("valid settings")
}

/// Client with a manual clock over the given gateway.
pub fn client_with(
    settings: ClientSettings,
    gateway: Arc<MockGateway>,
) -> (SecretsClient, ManualClock) {
    let clock = ManualClock::new();
    let client = SecretsClient::with_gateway_and_clock(settings, gateway, Arc::new(clock.clone()));
    (client, clock)
}

pub fn default_scope() -> SecretScope {
    SecretScope::new(PROJECT, "dev", "/")
}
