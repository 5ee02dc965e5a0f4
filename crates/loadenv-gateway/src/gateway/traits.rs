//! Secret gateway trait definition.

use async_trait::async_trait;
use indexmap::IndexMap;
use loadenv_core::{MachineIdentity, Result, SecretRecord, SecretScope, SecretValue};

use super::{ListOptions, NewSecret, SecretUpdate};

/// A remote secret-management service.
///
/// Every method receives a fully resolved [`SecretScope`]; defaulting of
/// project, environment and path happens before the gateway is called.
/// `credentials` replaces the gateway's own machine identity for that single
/// call when present.
///
/// Errors are reported with the `loadenv_core` taxonomy (`NotFound`,
/// `Authentication`, `Transport`, ...) and callers are expected to pass them
/// on unchanged.
///
/// # Implementors
///
/// - `InfisicalGateway` - Talks to the Infisical REST API
///
/// # Example
///
/// ```ignore
/// use loadenv_gateway::{SecretGateway, ListOptions};
///
/// struct StaticGateway;
///
/// #[async_trait]
/// impl SecretGateway for StaticGateway {
///     async fn list_secrets(&self, scope: &SecretScope, options: &ListOptions, credentials: Option<&MachineIdentity>) -> Result<Vec<SecretRecord>> {
///         Ok(Vec::new())
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait SecretGateway: Send + Sync {
    /// Fetches the value of a single secret.
    ///
    /// The default implementation extracts the value from
    /// [`get_secret_by_name`](Self::get_secret_by_name).
    async fn fetch_secret(
        &self,
        name: &str,
        scope: &SecretScope,
        credentials: Option<&MachineIdentity>,
    ) -> Result<SecretValue> {
        let record = self.get_secret_by_name(name, scope, credentials).await?;
        Ok(record.secret_value)
    }

    /// Fetches every secret of a scope as a name to value mapping.
    ///
    /// The default implementation lists the scope with [`ListOptions::default`]
    /// and keeps the first value seen for each key.
    async fn fetch_all_secrets(
        &self,
        scope: &SecretScope,
        credentials: Option<&MachineIdentity>,
    ) -> Result<IndexMap<String, SecretValue>> {
        let records = self
            .list_secrets(scope, &ListOptions::default(), credentials)
            .await?;

        let mut values = IndexMap::with_capacity(records.len());
        for record in records {
            values.entry(record.secret_key).or_insert(record.secret_value);
        }
        Ok(values)
    }

    /// Lists the full records of a scope.
    async fn list_secrets(
        &self,
        scope: &SecretScope,
        options: &ListOptions,
        credentials: Option<&MachineIdentity>,
    ) -> Result<Vec<SecretRecord>>;

    /// Creates a secret and returns the record the service stored.
    async fn create_secret(
        &self,
        secret: &NewSecret,
        scope: &SecretScope,
        credentials: Option<&MachineIdentity>,
    ) -> Result<SecretRecord>;

    /// Updates (and optionally renames) an existing secret.
    async fn update_secret(
        &self,
        update: &SecretUpdate,
        scope: &SecretScope,
        credentials: Option<&MachineIdentity>,
    ) -> Result<()>;

    /// Fetches the full record of a single secret.
    async fn get_secret_by_name(
        &self,
        name: &str,
        scope: &SecretScope,
        credentials: Option<&MachineIdentity>,
    ) -> Result<SecretRecord>;

    /// Returns the name of this gateway, for logging.
    fn name(&self) -> &str;
}
