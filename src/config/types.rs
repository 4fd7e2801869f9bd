use serde::Deserialize;
use std::path::PathBuf;

use crate::config::settings::SettingsConfig;
use crate::credentials::Credentials;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub iam: IamConfig,
    pub credentials: CredentialsConfig,
}

/// ================================
/// IAM issuer
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct IamConfig {
    pub url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

/// ================================
/// Credentials lookup
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    pub service_name: String, // e.g. speech_to_text
    pub providers: Option<Vec<ProviderKind>>,
    /// only consulted by the `static` provider
    #[serde(flatten)]
    pub values: Credentials,
    /// binding document file; `VCAP_SERVICES` when absent
    pub binding_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Static,
    Env,
    ServiceBinding,
}

pub const DEFAULT_PROVIDERS: [ProviderKind; 3] =
    [ProviderKind::Static, ProviderKind::Env, ProviderKind::ServiceBinding];
