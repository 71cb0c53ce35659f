//! In-memory bearer token cache.
//!
//! Holds at most one token. Nothing is persisted; losing the entry on restart
//! only costs one extra credential exchange.

use std::sync::Arc;

/// Tokens are treated as expired this long before their reported expiry.
pub const TOKEN_SAFETY_MARGIN_MS: i64 = 60_000;

/// Snapshot of the cached token and its absolute expiry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCacheEntry {
    pub token: Option<String>,
    pub expires_at_epoch_ms: i64,
}

impl TokenCacheEntry {
    /// A token is usable while `now < expires_at - TOKEN_SAFETY_MARGIN_MS`.
    pub fn is_valid(&self, now_ms: i64) -> bool {
        self.token.is_some()
            && now_ms < self.expires_at_epoch_ms.saturating_sub(TOKEN_SAFETY_MARGIN_MS)
    }
}

/// Shareable handle to a single cached token.
///
/// Clones share the same entry, so one cache can be injected into several
/// adapters or kept by a test to inspect.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    inner: Arc<tokio::sync::RwLock<TokenCacheEntry>>,
}

impl TokenCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached token if it is still valid at `now_ms`.
    pub async fn get(&self, now_ms: i64) -> Option<String> {
        let entry = self.inner.read().await;
        if entry.is_valid(now_ms) {
            entry.token.clone()
        } else {
            None
        }
    }

    /// Replaces the cached entry.
    pub async fn set(&self, token: impl Into<String>, expires_at_epoch_ms: i64) {
        let mut entry = self.inner.write().await;
        *entry = TokenCacheEntry {
            token: Some(token.into()),
            expires_at_epoch_ms,
        };
    }

    pub async fn is_valid(&self, now_ms: i64) -> bool {
        self.inner.read().await.is_valid(now_ms)
    }

    pub async fn entry(&self) -> TokenCacheEntry {
        self.inner.read().await.clone()
    }
}
