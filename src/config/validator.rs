//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks service name, issuer URL, client credential pairing,
//!   provider list, static credential shape, timeout and logging.

use std::collections::HashSet;

use regex::Regex;
use tracing::{error, info};

use crate::config::settings::SettingsConfig;
use crate::config::types::{CredentialsConfig, IamConfig, ProviderKind, ServiceConfig};
use crate::utils::constants::APIKEY_USERNAME;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_iam(&cfg.iam, &mut errors);
    validate_credentials(&cfg.credentials, &mut errors);

    if errors.is_empty() {
        info!("config is valid");
        Ok(())
    } else {
        for e in &errors {
            error!("config: {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.http_timeout_ms == Some(0) {
        errors.push("settings.http_timeout_ms must be > 0".to_string());
    }
    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' is invalid; allowed: {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn validate_iam(iam: &IamConfig, errors: &mut Vec<String>) {
    if let Some(url) = &iam.url {
        validate_url("iam.url", url, errors);
    }
    if iam.client_id.is_some() != iam.client_secret.is_some() {
        errors.push("iam.client_id and iam.client_secret must be set together".to_string());
    }
}

fn validate_credentials(creds: &CredentialsConfig, errors: &mut Vec<String>) {
    let name_re = Regex::new(r"^[a-z][a-z0-9_-]*$").unwrap();
    if !name_re.is_match(&creds.service_name) {
        errors.push(format!(
            "credentials.service_name '{}' must match [a-z][a-z0-9_-]*",
            creds.service_name
        ));
    }

    let providers = creds.providers.as_deref().unwrap_or_default();
    if creds.providers.is_some() && providers.is_empty() {
        errors.push("credentials.providers is empty; at least one provider required".to_string());
    }
    let mut seen = HashSet::new();
    for p in providers {
        if !seen.insert(p) {
            errors.push(format!("credentials.providers has duplicate entry {:?}", p));
        }
    }

    let values = &creds.values;
    if values.apikey.is_some() && values.access_token.is_some() {
        errors.push("credentials: set either apikey or access_token, not both".to_string());
    }
    if values.username.is_some() != values.password.is_some() {
        errors.push("credentials: username and password must be set together".to_string());
    }
    if values.username.as_deref() == Some(APIKEY_USERNAME) && values.apikey.is_some() {
        errors.push(format!(
            "credentials: username '{}' carries the key in password; drop apikey",
            APIKEY_USERNAME
        ));
    }
    if let Some(url) = &values.url {
        validate_url("credentials.url", url, errors);
    }
    if let Some(url) = &values.iam_url {
        validate_url("credentials.iam_url", url, errors);
    }

    if creds.binding_path.is_some() && !providers.contains(&ProviderKind::ServiceBinding) {
        errors.push("credentials.binding_path is set but 'service_binding' provider is not enabled".to_string());
    }
    if let Some(path) = &creds.binding_path {
        if !path.is_absolute() {
            errors.push(format!("credentials.binding_path '{}' must be absolute, not relative", path.display()));
        }
    }
}

fn validate_url(field: &str, url: &str, errors: &mut Vec<String>) {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(format!("{} '{}' must start with http:// or https://", field, url));
    }
}
