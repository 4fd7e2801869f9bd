use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::token::TokenRecord;

/// Shared token state of a single manager.
///
/// Readers get a full copy; writers swap the whole record, so no caller
/// ever sees a half-updated token.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    inner: Arc<RwLock<TokenRecord>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(TokenRecord::default())) }
    }

    pub async fn snapshot(&self) -> TokenRecord {
        self.inner.read().await.clone()
    }

    pub async fn replace(&self, record: TokenRecord) {
        *self.inner.write().await = record;
    }

    /// Cached access token if present and usable at `now`.
    pub async fn get(&self, now: i64) -> Option<String> {
        let record = self.inner.read().await;
        Some(record.access_token.clone()).filter(|_| record.is_usable(now))
    }
}
