//! # Cloud IAM Auth Library
//!
//! Supplies bearer tokens to cloud service clients: mints tokens from an
//! API key, refreshes them before they expire, caches them in memory and
//! attaches them to outgoing requests.
//!
//! Modules:
//! - `cache` — token record and the in-memory token cache
//! - `iam` — token exchange client and the token manager
//! - `auth` — request authenticators (basic / IAM bearer)
//! - `credentials` — credential discovery (static, env, service binding)
//! - `config` — service configuration, loading and validation

pub mod auth;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod helpers;
pub mod iam;
pub mod observability;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::auth::authenticator::Authenticator;
pub use crate::cache::token::TokenRecord;
pub use crate::config::types::ServiceConfig;
pub use crate::error::IamError;
pub use crate::iam::manager::{ManagerConfig, TokenManager};
