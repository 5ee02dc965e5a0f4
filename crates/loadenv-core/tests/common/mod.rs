#![allow(dead_code)]
use loadenv_core::SecretRecord;

/// Helper to build a SecretRecord from a raw JSON string slice.
/// Panics if the JSON is invalid (intended for tests).
pub fn record_from_json(json: &str) -> SecretRecord {
    serde_json::from_str(json).expect("Failed to create test record from JSON")
}

/// Returns a record fixture shaped like a list response item.
pub fn database_record() -> SecretRecord {
    record_from_json(
        r#"{
        "id": "64f0c2",
        "workspace": "proj-main",
        "environment": "prod",
        "version": 7,
        "type": "shared",
        "secretKey": "DATABASE_URL",
        "secretValue": "postgres://app:pw@db:5432/app",
        "secretComment": "",
        "secretPath": "/backend",
        "skipMultilineEncoding": true,
        "secretReminderRepeatDays": 30,
        "secretReminderNote": "rotate",
        "updatedAt": "2024-06-01T12:30:00Z"
    }"#,
    )
}
