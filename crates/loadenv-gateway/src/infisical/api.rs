//! Wire types and response handling for the Infisical REST API.

use loadenv_core::{LoadEnvError, Result, SecretMetadataEntry, SecretRecord};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub(crate) const LOGIN_PATH: &str = "/api/v1/auth/universal-auth/login";
pub(crate) const SECRETS_PATH: &str = "/api/v3/secrets/raw";
pub(crate) const SHARED_TYPE: &str = "shared";

#[derive(Debug, Deserialize)]
pub(crate) struct SecretEnvelope {
    pub secret: SecretRecord,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SecretListEnvelope {
    pub secrets: Vec<SecretRecord>,
    #[serde(default)]
    pub imports: Vec<ImportedFolder>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImportedFolder {
    #[serde(default)]
    pub secrets: Vec<SecretRecord>,
}

impl SecretListEnvelope {
    /// Flattens own and imported secrets. Own secrets win on key clashes,
    /// and earlier imports win over later ones.
    pub fn into_records(self, include_imports: bool) -> Vec<SecretRecord> {
        let mut records = self.secrets;
        if include_imports {
            for folder in self.imports {
                for secret in folder.secrets {
                    if !records.iter().any(|r| r.secret_key == secret.secret_key) {
                        records.push(secret);
                    }
                }
            }
        }
        records
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub access_token: loadenv_core::SecretValue,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    7200
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateSecretBody<'a> {
    pub workspace_id: &'a str,
    pub environment: &'a str,
    pub secret_path: &'a str,
    pub secret_value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_comment: Option<&'a str>,
    pub skip_multiline_encoding: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_reminder_repeat_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_reminder_note: Option<&'a str>,
    #[serde(rename = "type")]
    pub secret_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateSecretBody<'a> {
    pub workspace_id: &'a str,
    pub environment: &'a str,
    pub secret_path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_value: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_secret_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_comment: Option<&'a str>,
    pub skip_multiline_encoding: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_reminder_repeat_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_reminder_note: Option<&'a str>,
    pub secret_metadata: &'a [SecretMetadataEntry],
    pub tag_ids: &'a [String],
    #[serde(rename = "type")]
    pub secret_type: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Maps a non-success status to the error taxonomy.
pub(crate) fn status_error(status: StatusCode, body: &str, resource: &str) -> LoadEnvError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.error)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LoadEnvError::authentication(message),
        StatusCode::NOT_FOUND => LoadEnvError::not_found(resource),
        _ => LoadEnvError::api(status.as_u16(), message),
    }
}

/// Maps a reqwest failure (connect, timeout, body) to a transport error.
pub(crate) fn transport_error(resource: &str, err: reqwest::Error) -> LoadEnvError {
    let message = if err.is_timeout() {
        format!("request for {} timed out", resource)
    } else if err.is_connect() {
        format!("could not connect while requesting {}", resource)
    } else {
        format!("request for {} failed", resource)
    };
    LoadEnvError::transport_with_cause(message, err)
}

/// Checks the status and decodes a JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, resource: &str) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(resource, e))?;

    if !status.is_success() {
        return Err(status_error(status, &body, resource));
    }

    serde_json::from_str(&body).map_err(|e| {
        LoadEnvError::invalid_response(format!("could not decode {}: {}", resource, e))
    })
}

/// Checks the status and discards the body.
pub(crate) async fn expect_success(response: Response, resource: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body, resource))
}
