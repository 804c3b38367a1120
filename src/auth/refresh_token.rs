/// Refresh Token Store
///
/// Tracks which refresh tokens this process has issued. A refresh token can
/// only be redeemed while it is a member here, regardless of whether its
/// signature still verifies.
///
/// The in-memory store:
/// - keeps SHA-256 digests, never plaintext tokens
/// - is empty on start, so tokens issued before a restart are unredeemable
/// - drops expired entries whenever a new token is registered
/// - is safe to share across actix workers

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Registry of currently valid refresh tokens
pub trait RefreshStore: Send + Sync {
    /// Record a freshly issued refresh token expiring at `expires_at` (Unix seconds)
    fn register(&self, token: &str, expires_at: i64);

    /// Whether `token` was issued by this process and not revoked
    fn is_member(&self, token: &str) -> bool;

    /// Remove `token`; returns whether it was present
    fn revoke(&self, token: &str) -> bool;
}

/// Process-local refresh store guarded by an `RwLock`
///
/// Maps token digest to its `exp`.
#[derive(Default)]
pub struct InMemoryRefreshStore {
    digests: RwLock<HashMap<String, i64>>,
}

impl InMemoryRefreshStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.digests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register `token`, first dropping every entry already expired at `now`
    pub fn register_at(&self, token: &str, expires_at: i64, now: i64) {
        // Map operations never leave partial state; poisoning is ignored.
        let mut digests = self.digests.write().unwrap_or_else(PoisonError::into_inner);

        let before = digests.len();
        digests.retain(|_, exp| now <= *exp);
        let pruned = before - digests.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Dropped expired refresh tokens");
        }

        digests.insert(hash_token(token), expires_at);
    }
}

impl RefreshStore for InMemoryRefreshStore {
    fn register(&self, token: &str, expires_at: i64) {
        self.register_at(token, expires_at, chrono::Utc::now().timestamp());
    }

    fn is_member(&self, token: &str) -> bool {
        self.digests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&hash_token(token))
    }

    fn revoke(&self, token: &str) -> bool {
        self.digests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&hash_token(token))
            .is_some()
    }
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const T0: i64 = 1_600_000_000;
    const FAR_FUTURE: i64 = i64::MAX;

    #[test]
    fn test_register_then_member() {
        let store = InMemoryRefreshStore::new();
        assert!(!store.is_member("abc"));

        store.register("abc", FAR_FUTURE);

        assert!(store.is_member("abc"));
        assert!(!store.is_member("abd"));
    }

    #[test]
    fn test_register_is_idempotent() {
        let store = InMemoryRefreshStore::new();
        store.register("abc", FAR_FUTURE);
        store.register("abc", FAR_FUTURE);

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_revoke() {
        let store = InMemoryRefreshStore::new();
        store.register("abc", FAR_FUTURE);

        assert!(store.revoke("abc"));
        assert!(!store.is_member("abc"));
        assert!(!store.revoke("abc"));
    }

    #[test]
    fn test_register_drops_expired_entries() {
        let store = InMemoryRefreshStore::new();
        for i in 0..1000 {
            store.register_at(&format!("old-{}", i), T0 + 18000, T0);
        }
        assert_eq!(store.len(), 1000);

        store.register_at("fresh", T0 + 18001 + 18000, T0 + 18001);

        assert_eq!(store.len(), 1);
        assert!(store.is_member("fresh"));
        assert!(!store.is_member("old-0"));
    }

    #[test]
    fn test_entry_survives_until_its_exact_expiry() {
        let store = InMemoryRefreshStore::new();
        store.register_at("edge", T0, T0 - 10);

        store.register_at("other", FAR_FUTURE, T0);
        assert!(store.is_member("edge"));

        store.register_at("another", FAR_FUTURE, T0 + 1);
        assert!(!store.is_member("edge"));
    }

    #[test]
    fn test_expired_entry_stays_until_next_register() {
        let store = InMemoryRefreshStore::new();
        store.register_at("stale", T0, T0);

        // Lookups never prune, so an expired token remains a member here.
        assert!(store.is_member("stale"));
    }

    #[test]
    fn test_token_hashing() {
        let hash1 = hash_token("some-token");
        let hash2 = hash_token("some-token");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, "some-token");
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_concurrent_register_and_lookup() {
        let store = Arc::new(InMemoryRefreshStore::new());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let token = format!("token-{}-{}", worker, i);
                        store.register(&token, FAR_FUTURE);
                        assert!(store.is_member(&token));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("worker panicked");
        }

        assert_eq!(store.len(), 800);
    }
}
