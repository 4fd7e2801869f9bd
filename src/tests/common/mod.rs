// tests/common/mod.rs
use std::sync::Arc;

use httpmock::MockServer;
pub use serde_json::json;
use serde_json::Value;

use crate::helpers::time::ManualClock;
use crate::iam::manager::{ManagerConfig, TokenManager};

pub const TOKEN_PATH: &str = "/identity/token";

/// Simulated "now" at which the first token is minted.
pub const T0: i64 = 1_700_000_000;
/// Expiration reported for the first token (`T0 + 3600`).
pub const EXP1: i64 = 1_700_003_600;

pub fn token_body(access: &str, refresh: &str, expires_in: i64, expiration: i64) -> Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "Bearer",
        "expires_in": expires_in,
        "expiration": expiration
    })
}

/// Manager bound to the mock issuer and a manual clock starting at `T0`.
pub fn build_manager(server: &MockServer, config: ManagerConfig) -> (TokenManager, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let manager = TokenManager::new(config.iam_url(server.url(TOKEN_PATH)))
        .expect("manager config")
        .with_clock(clock.clone());
    (manager, clock)
}
