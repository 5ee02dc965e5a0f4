//! Infisical REST implementation of the secret gateway.

mod api;
mod auth;
mod config;

pub use config::{DEFAULT_HOST, InfisicalConfig, InfisicalConfigBuilder};

use std::time::Duration;

use async_trait::async_trait;
use loadenv_core::{LoadEnvError, MachineIdentity, Result, SecretRecord, SecretScope, SecretValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::{debug, info};

use crate::gateway::{ListOptions, NewSecret, SecretGateway, SecretUpdate};
use api::{
    CreateSecretBody, LoginRequest, LoginResponse, SHARED_TYPE, SecretEnvelope,
    SecretListEnvelope, UpdateSecretBody,
};
use auth::TokenCache;

/// A gateway backed by the Infisical REST API.
///
/// Logs in with universal auth on first use of each machine identity and
/// reuses the access token until shortly before it expires.
pub struct InfisicalGateway {
    http: reqwest::Client,
    config: InfisicalConfig,
    tokens: TokenCache,
}

impl InfisicalGateway {
    /// Creates a gateway. No network traffic happens until the first call.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the HTTP client cannot be built.
    pub fn new(config: InfisicalConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LoadEnvError::internal(format!("failed to build HTTP client: {}", e)))?;

        info!(host = %config.host(), "Infisical gateway initialized");

        Ok(Self {
            http,
            config,
            tokens: TokenCache::default(),
        })
    }

    /// Returns the gateway configuration.
    pub fn config(&self) -> &InfisicalConfig {
        &self.config
    }

    fn identity<'a>(
        &'a self,
        credentials: Option<&'a MachineIdentity>,
    ) -> Result<&'a MachineIdentity> {
        credentials.or(self.config.credentials()).ok_or_else(|| {
            LoadEnvError::configuration(
                "no machine identity configured; set INFISICAL_MACHINE_ID and INFISICAL_SECRET_KEY",
            )
        })
    }

    async fn access_token(&self, identity: &MachineIdentity) -> Result<SecretValue> {
        if let Some(token) = self.tokens.get(identity).await {
            return Ok(token);
        }

        debug!(client_id = %identity.client_id(), "logging in with machine identity");

        let response = self
            .http
            .post(self.config.url(api::LOGIN_PATH))
            .json(&LoginRequest {
                client_id: identity.client_id(),
                client_secret: identity.client_secret().expose(),
            })
            .send()
            .await
            .map_err(|e| api::transport_error("universal-auth login", e))?;

        let login: LoginResponse = api::read_json(response, "universal-auth login").await?;
        self.tokens
            .store(
                identity,
                login.access_token.clone(),
                Duration::from_secs(login.expires_in),
            )
            .await;

        Ok(login.access_token)
    }

    /// Authenticates and sends a request. A 401 drops the cached token so
    /// the next call logs in again.
    async fn send(
        &self,
        request: RequestBuilder,
        credentials: Option<&MachineIdentity>,
        resource: &str,
    ) -> Result<Response> {
        let identity = self.identity(credentials)?;
        let token = self.access_token(identity).await?;

        let response = request
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| api::transport_error(resource, e))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.tokens.evict(identity.client_id()).await;
        }

        Ok(response)
    }

    fn secret_url(&self, name: &str) -> String {
        self.config.url(&format!(
            "{}/{}",
            api::SECRETS_PATH,
            urlencoding::encode(name)
        ))
    }
}

#[async_trait]
impl SecretGateway for InfisicalGateway {
    async fn list_secrets(
        &self,
        scope: &SecretScope,
        options: &ListOptions,
        credentials: Option<&MachineIdentity>,
    ) -> Result<Vec<SecretRecord>> {
        let resource = format!("secrets in {}", scope);

        let mut query = vec![
            ("workspaceId", scope.project().to_string()),
            ("environment", scope.environment().to_string()),
            ("secretPath", scope.path().to_string()),
            (
                "expandSecretReferences",
                options.expand_secret_references.to_string(),
            ),
            ("viewSecretValue", options.view_secret_value.to_string()),
            ("recursive", options.recursive.to_string()),
            ("include_imports", options.include_imports.to_string()),
        ];
        if !options.tag_filters.is_empty() {
            query.push(("tagSlugs", options.tag_filters.join(",")));
        }

        let request = self.http.get(self.config.url(api::SECRETS_PATH)).query(&query);
        let response = self.send(request, credentials, &resource).await?;
        let envelope: SecretListEnvelope = api::read_json(response, &resource).await?;

        let records = envelope.into_records(options.include_imports);
        debug!(scope = %scope, count = records.len(), "listed secrets");
        Ok(records)
    }

    async fn create_secret(
        &self,
        secret: &NewSecret,
        scope: &SecretScope,
        credentials: Option<&MachineIdentity>,
    ) -> Result<SecretRecord> {
        let resource = format!("secret '{}' in {}", secret.name(), scope);

        let body = CreateSecretBody {
            workspace_id: scope.project(),
            environment: scope.environment(),
            secret_path: scope.path(),
            secret_value: secret.value().expose(),
            secret_comment: secret.comment_text(),
            skip_multiline_encoding: secret.skips_multiline_encoding(),
            secret_reminder_repeat_days: secret.reminder_repeat_days(),
            secret_reminder_note: secret.reminder_note(),
            secret_type: SHARED_TYPE,
        };

        let request = self.http.post(self.secret_url(secret.name())).json(&body);
        let response = self.send(request, credentials, &resource).await?;
        let envelope: SecretEnvelope = api::read_json(response, &resource).await?;
        Ok(envelope.secret)
    }

    async fn update_secret(
        &self,
        update: &SecretUpdate,
        scope: &SecretScope,
        credentials: Option<&MachineIdentity>,
    ) -> Result<()> {
        let resource = format!("secret '{}' in {}", update.current_name(), scope);

        let body = UpdateSecretBody {
            workspace_id: scope.project(),
            environment: scope.environment(),
            secret_path: scope.path(),
            secret_value: update.new_value().map(SecretValue::expose),
            new_secret_name: update.new_name(),
            secret_comment: update.comment_text(),
            skip_multiline_encoding: update.skips_multiline_encoding(),
            secret_reminder_repeat_days: update.reminder_repeat_days(),
            secret_reminder_note: update.reminder_note(),
            secret_metadata: update.metadata_entries(),
            tag_ids: update.tag_ids(),
            secret_type: SHARED_TYPE,
        };

        let request = self
            .http
            .patch(self.secret_url(update.current_name()))
            .json(&body);
        let response = self.send(request, credentials, &resource).await?;
        api::expect_success(response, &resource).await
    }

    async fn get_secret_by_name(
        &self,
        name: &str,
        scope: &SecretScope,
        credentials: Option<&MachineIdentity>,
    ) -> Result<SecretRecord> {
        let resource = format!("secret '{}' in {}", name, scope);

        let request = self.http.get(self.secret_url(name)).query(&[
            ("workspaceId", scope.project()),
            ("environment", scope.environment()),
            ("secretPath", scope.path()),
            ("type", SHARED_TYPE),
            ("include_imports", "true"),
            ("expandSecretReferences", "true"),
        ]);
        let response = self.send(request, credentials, &resource).await?;
        let envelope: SecretEnvelope = api::read_json(response, &resource).await?;
        Ok(envelope.secret)
    }

    fn name(&self) -> &str {
        "infisical"
    }
}
