use serde::Deserialize;

use crate::utils::constants::{REFRESH_AFTER_PERCENT, REFRESH_TOKEN_LIFETIME_SECONDS};

/// Cached IAM credential state.
///
/// Replaced as a whole after every successful mint or refresh. An empty
/// `access_token` means nothing was fetched yet; in that state the
/// expiration fields carry no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: String,
    /// lifetime in seconds as reported by the issuer
    #[serde(rename = "expires_in")]
    pub issued_duration_seconds: i64,
    /// UNIX seconds
    #[serde(rename = "expiration")]
    pub expiration_epoch_seconds: i64,
}

impl TokenRecord {
    pub fn is_absent(&self) -> bool {
        self.access_token.is_empty()
    }

    /// Instant after which the access token is treated as expired.
    pub fn refresh_threshold(&self) -> i64 {
        let margin = self.issued_duration_seconds.saturating_mul(100 - REFRESH_AFTER_PERCENT) / 100;
        self.expiration_epoch_seconds.saturating_sub(margin)
    }

    pub fn refresh_window_end(&self) -> i64 {
        self.expiration_epoch_seconds.saturating_add(REFRESH_TOKEN_LIFETIME_SECONDS)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.refresh_threshold() < now
    }

    pub fn is_refresh_token_expired(&self, now: i64) -> bool {
        self.refresh_window_end() < now
    }

    /// Present and not yet inside the pre-expiry margin.
    pub fn is_usable(&self, now: i64) -> bool {
        !self.is_absent() && !self.is_expired(now)
    }

    pub fn can_refresh(&self, now: i64) -> bool {
        !self.is_absent() && !self.refresh_token.is_empty() && !self.is_refresh_token_expired(now)
    }
}
