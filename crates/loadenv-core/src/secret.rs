//! Secret value wrapper and full secret records.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

const REDACTED: &str = "**********";

/// A secret string that never shows up in `Debug` or `Display` output.
///
/// The raw value is only reachable through [`SecretValue::expose`]. Cloning
/// produces an independent copy, so handing a clone to a caller never gives
/// them access to the cache's own copy.
///
/// # Example
///
/// ```
/// use loadenv_core::SecretValue;
///
/// let value = SecretValue::new("postgres://user:pw@db/app");
/// assert_eq!(value.to_string(), "**********");
/// assert_eq!(value.expose(), "postgres://user:pw@db/app");
/// ```
pub struct SecretValue(SecretString);

impl SecretValue {
    /// Wraps a raw secret.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(SecretString::from(raw.into()))
    }

    /// Returns the raw secret.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Returns true if the raw secret is empty.
    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl Clone for SecretValue {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_owned())
    }
}

impl PartialEq for SecretValue {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for SecretValue {}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretValue({})", REDACTED)
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl From<&str> for SecretValue {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// A tag attached to a secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretTag {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// A key/value metadata pair attached to a secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretMetadataEntry {
    pub key: String,
    pub value: String,
}

impl SecretMetadataEntry {
    /// Creates a metadata entry.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Full secret record as returned by the remote service.
///
/// Listing and by-name lookups return this; the cache never stores it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "_id", default)]
    legacy_id: Option<String>,
    /// Project identifier (the remote service calls it a workspace).
    #[serde(rename = "workspace", default)]
    pub project: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub version: u32,
    #[serde(rename = "type", default = "default_secret_type")]
    pub secret_type: String,
    pub secret_key: String,
    pub secret_value: SecretValue,
    #[serde(default)]
    pub secret_comment: String,
    #[serde(default)]
    pub secret_path: Option<String>,
    #[serde(default)]
    pub secret_reminder_note: Option<String>,
    #[serde(default)]
    pub secret_reminder_repeat_days: Option<u32>,
    #[serde(default)]
    pub skip_multiline_encoding: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<SecretTag>,
    #[serde(default)]
    pub secret_metadata: Vec<SecretMetadataEntry>,
}

fn default_secret_type() -> String {
    "shared".to_string()
}

impl SecretRecord {
    /// Returns the record id, whichever field the service used for it.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().or(self.legacy_id.as_deref())
    }
}
