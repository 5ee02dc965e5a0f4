//! Access-token reuse for universal-auth logins.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use loadenv_core::{MachineIdentity, SecretValue};
use tokio::sync::RwLock;
use tracing::debug;

/// Tokens closer than this to expiry are not handed out.
const REFRESH_MARGIN: Duration = Duration::from_secs(30);

/// Upper bound for the lifetime announced by the server.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(30 * 24 * 60 * 60);

struct CachedToken {
    client_secret: SecretValue,
    token: SecretValue,
    expires_at: Instant,
}

/// Access tokens keyed by machine-identity client id.
///
/// A token is only handed out to the exact identity that obtained it: the
/// same client id with another secret must log in again.
#[derive(Default)]
pub(crate) struct TokenCache {
    tokens: RwLock<HashMap<String, CachedToken>>,
}

impl TokenCache {
    /// Returns a token that is still valid for at least the refresh margin.
    pub async fn get(&self, identity: &MachineIdentity) -> Option<SecretValue> {
        let tokens = self.tokens.read().await;
        tokens
            .get(identity.client_id())
            .filter(|cached| &cached.client_secret == identity.client_secret())
            .filter(|cached| cached.expires_at > Instant::now() + REFRESH_MARGIN)
            .map(|cached| cached.token.clone())
    }

    /// Stores a freshly issued token. Lifetimes above thirty days are capped.
    pub async fn store(&self, identity: &MachineIdentity, token: SecretValue, expires_in: Duration) {
        let expires_in = expires_in.min(MAX_TOKEN_LIFETIME);
        let mut tokens = self.tokens.write().await;
        tokens.insert(
            identity.client_id().to_string(),
            CachedToken {
                client_secret: identity.client_secret().clone(),
                token,
                expires_at: Instant::now() + expires_in,
            },
        );
        debug!(
            client_id = %identity.client_id(),
            expires_in_secs = expires_in.as_secs(),
            "access token stored"
        );
    }

    /// Drops the token of a client id, forcing a new login on next use.
    pub async fn evict(&self, client_id: &str) {
        let mut tokens = self.tokens.write().await;
        if tokens.remove(client_id).is_some() {
            debug!(client_id = %client_id, "access token evicted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(secret: &str) -> MachineIdentity {
        MachineIdentity::new("id", secret)
    }

    #[tokio::test]
    async fn test_store_and_get() {
        let cache = TokenCache::default();
        cache
            .store(&identity("s"), SecretValue::new("tok"), Duration::from_secs(3600))
            .await;

        assert_eq!(cache.get(&identity("s")).await.unwrap().expose(), "tok");
        assert!(cache.get(&MachineIdentity::new("other", "s")).await.is_none());
    }

    #[tokio::test]
    async fn test_same_client_id_with_other_secret_gets_no_token() {
        let cache = TokenCache::default();
        cache
            .store(&identity("right"), SecretValue::new("tok"), Duration::from_secs(3600))
            .await;

        assert!(cache.get(&identity("wrong")).await.is_none());
        assert!(cache.get(&identity("right")).await.is_some());
    }

    #[tokio::test]
    async fn test_nearly_expired_token_is_not_returned() {
        let cache = TokenCache::default();
        cache
            .store(&identity("s"), SecretValue::new("tok"), Duration::from_secs(10))
            .await;

        assert!(cache.get(&identity("s")).await.is_none());
    }

    #[tokio::test]
    async fn test_huge_lifetime_is_capped() {
        let cache = TokenCache::default();
        cache
            .store(&identity("s"), SecretValue::new("tok"), Duration::from_secs(u64::MAX))
            .await;

        assert!(cache.get(&identity("s")).await.is_some());
    }

    #[tokio::test]
    async fn test_evict() {
        let cache = TokenCache::default();
        cache
            .store(&identity("s"), SecretValue::new("tok"), Duration::from_secs(3600))
            .await;
        cache.evict("id").await;

        assert!(cache.get(&identity("s")).await.is_none());
    }
}
