//! Credential discovery
//!
//! Each deployment target gets its own provider; `ChainProvider` tries them
//! in the configured order.

use serde::Deserialize;

use crate::error::IamError;

pub mod chain;
pub mod env;
pub mod service_binding;

pub use chain::ChainProvider;
pub use env::EnvProvider;
pub use service_binding::ServiceBindingProvider;

/// Credentials of one service instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    #[serde(default, alias = "iam_apikey")]
    pub apikey: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// service endpoint
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub iam_url: Option<String>,
}

impl Credentials {
    /// Carries something an authenticator can use.
    pub fn is_usable(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        set(&self.apikey) || set(&self.access_token) || (set(&self.username) && set(&self.password))
    }
}

pub trait CredentialProvider: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// `IamError::CredentialsNotFound` when this provider has nothing for the service.
    fn resolve(&self) -> Result<Credentials, IamError>;
}

/// Credentials given explicitly, e.g. from the config file.
#[derive(Debug, Clone)]
pub struct StaticProvider(pub Credentials);

impl CredentialProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn resolve(&self) -> Result<Credentials, IamError> {
        Some(self.0.clone())
            .filter(Credentials::is_usable)
            .ok_or_else(|| IamError::CredentialsNotFound("no static credentials configured".to_owned()))
    }
}

/// `speech-to-text` -> `SPEECH_TO_TEXT`
pub fn env_prefix(service_name: &str) -> String {
    service_name.to_uppercase().replace('-', "_")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn usable_requires_key_token_or_pair() {
        assert!(!Credentials::default().is_usable());
        assert!(Credentials { apikey: Some("k".into()), ..Default::default() }.is_usable());
        assert!(Credentials { access_token: Some("t".into()), ..Default::default() }.is_usable());
        assert!(!Credentials { username: Some("u".into()), ..Default::default() }.is_usable());
        assert!(Credentials {
            username: Some("u".into()),
            password: Some("p".into()),
            ..Default::default()
        }
        .is_usable());
        assert!(!Credentials { apikey: Some(String::new()), ..Default::default() }.is_usable());
    }

    #[test]
    fn static_provider_reports_not_found_when_empty() {
        let err = StaticProvider(Credentials::default()).resolve().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn env_prefix_is_upper_snake() {
        assert_eq!(env_prefix("speech-to-text"), "SPEECH_TO_TEXT");
        assert_eq!(env_prefix("natural_language_understanding"), "NATURAL_LANGUAGE_UNDERSTANDING");
    }
}
