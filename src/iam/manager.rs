use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::cache::token::TokenRecord;
use crate::cache::token_cache::TokenCache;
use crate::error::IamError;
use crate::helpers::time::{format_unix, Clock, SystemClock};
use crate::iam::request::IamClient;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::{
    DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_IAM_CLIENT_ID, DEFAULT_IAM_CLIENT_SECRET, DEFAULT_IAM_URL,
};

/// Inputs of a `TokenManager`.
#[derive(Debug, Clone, Default)]
pub struct ManagerConfig {
    /// Token owned by the caller; disables mint and refresh.
    pub user_token: Option<String>,
    pub api_key: Option<String>,
    pub iam_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub http_timeout_ms: Option<u64>,
}

impl ManagerConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self { api_key: Some(api_key.into()), ..Default::default() }
    }

    pub fn with_user_token(token: impl Into<String>) -> Self {
        Self { user_token: Some(token.into()), ..Default::default() }
    }

    pub fn iam_url(mut self, url: impl Into<String>) -> Self {
        self.iam_url = Some(url.into());
        self
    }

    pub fn validate(&self) -> Result<(), IamError> {
        let has_token = self.user_token.as_deref().is_some_and(|t| !t.is_empty());
        let has_key = self.api_key.as_deref().is_some_and(|k| !k.is_empty());
        if !has_token && !has_key {
            return Err(IamError::Misconfiguration(
                "either an access token or an API key is required".to_owned(),
            ));
        }
        if let Some(url) = &self.iam_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(IamError::Misconfiguration(format!("iam url '{}' must be http(s)", url)));
            }
        }
        if self.client_id.is_some() != self.client_secret.is_some() {
            return Err(IamError::Misconfiguration(
                "iam client_id and client_secret must be set together".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Credentials {
    user_token: Option<String>,
    api_key: Option<String>,
}

/// Supplies bearer tokens, minting or refreshing them only when due.
///
/// Safe to share behind an `Arc`: at most one mint/refresh call is in flight,
/// and callers that queued behind it reuse its result.
#[derive(Debug)]
pub struct TokenManager {
    client: IamClient,
    cache: TokenCache,
    credentials: RwLock<Credentials>,
    refresh_lock: Mutex<()>,
    clock: Arc<dyn Clock>,
}

impl TokenManager {
    pub fn new(config: ManagerConfig) -> Result<Self, IamError> {
        config.validate()?;
        let client = IamClient::new(
            config.iam_url.as_deref().unwrap_or(DEFAULT_IAM_URL),
            config.client_id.as_deref().unwrap_or(DEFAULT_IAM_CLIENT_ID),
            config.client_secret.as_deref().unwrap_or(DEFAULT_IAM_CLIENT_SECRET),
            config.http_timeout_ms.unwrap_or(DEFAULT_HTTP_TIMEOUT_MS),
        )?;
        Ok(Self {
            client,
            cache: TokenCache::new(),
            credentials: RwLock::new(Credentials {
                user_token: config.user_token.filter(|t| !t.is_empty()),
                api_key: config.api_key.filter(|k| !k.is_empty()),
            }),
            refresh_lock: Mutex::new(()),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn iam_url(&self) -> &str {
        self.client.url()
    }

    /// Switch to a caller-managed token. It is returned as-is from now on.
    /// An empty token leaves user-managed mode.
    pub async fn set_token(&self, token: impl Into<String>) {
        let token = Some(token.into()).filter(|t| !t.is_empty());
        if token.is_some() {
            info!("switched to user-managed access token");
        } else {
            info!("user-managed access token cleared");
        }
        self.credentials.write().await.user_token = token;
    }

    pub async fn set_key(&self, key: impl Into<String>) {
        self.credentials.write().await.api_key = Some(key.into());
    }

    pub async fn token_record(&self) -> TokenRecord {
        self.cache.snapshot().await
    }

    /// Return a bearer token that is not inside its pre-expiry margin.
    pub async fn get_token(&self) -> Result<String, IamError> {
        if let Some(token) = self.credentials.read().await.user_token.clone() {
            return Ok(token);
        }

        if let Some(token) = self.cache.get(self.clock.now()).await {
            get_metrics().await.token_cache_hits.inc();
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        // another caller may have refreshed while we waited
        let now = self.clock.now();
        let current = self.cache.snapshot().await;
        if current.is_usable(now) {
            get_metrics().await.token_cache_hits.inc();
            return Ok(current.access_token);
        }

        let fresh = if current.can_refresh(now) {
            debug!(
                "access token past refresh threshold {}, refreshing",
                format_unix(current.refresh_threshold())
            );
            self.client.refresh(&current.refresh_token).await?
        } else {
            if current.is_absent() {
                debug!("no access token cached, minting");
            } else {
                debug!("refresh token unusable, minting");
            }
            let api_key = self.credentials.read().await.api_key.clone().ok_or_else(|| {
                IamError::Misconfiguration("no API key available to mint a token".to_owned())
            })?;
            self.client.mint(&api_key).await?
        };

        info!("new access token expires at {}", format_unix(fresh.expiration_epoch_seconds));
        let token = fresh.access_token.clone();
        self.cache.replace(fresh).await;
        Ok(token)
    }
}
