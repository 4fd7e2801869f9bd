use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::header::AUTHORIZATION;
use reqwest::RequestBuilder;
use tracing::info;

use crate::config::settings::SettingsConfig;
use crate::config::types::IamConfig;
use crate::credentials::Credentials;
use crate::error::IamError;
use crate::iam::manager::{ManagerConfig, TokenManager};
use crate::utils::constants::APIKEY_USERNAME;

/// How a service client authorizes its requests.
#[derive(Debug, Clone)]
pub enum Authenticator {
    Basic { username: String, password: String },
    Iam(Arc<TokenManager>),
}

impl Authenticator {
    /// Pick the scheme the credentials call for.
    ///
    /// Order: caller-owned access token, API key, `apikey` username with the
    /// key as password, then plain username/password.
    pub fn from_credentials(
        credentials: &Credentials,
        settings: &SettingsConfig,
        iam: &IamConfig,
    ) -> Result<Self, IamError> {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());

        let mut manager_config = ManagerConfig {
            user_token: None,
            api_key: None,
            iam_url: iam.url.clone().or_else(|| non_empty(&credentials.iam_url)),
            client_id: iam.client_id.clone(),
            client_secret: iam.client_secret.clone(),
            http_timeout_ms: settings.http_timeout_ms,
        };

        if let Some(token) = non_empty(&credentials.access_token) {
            manager_config.user_token = Some(token);
        } else if let Some(key) = non_empty(&credentials.apikey) {
            manager_config.api_key = Some(key);
        } else {
            let username = non_empty(&credentials.username);
            let password = non_empty(&credentials.password);
            match (username, password) {
                (Some(username), Some(password)) if username == APIKEY_USERNAME => {
                    manager_config.api_key = Some(password);
                }
                (Some(username), Some(password)) => {
                    info!("using basic authentication");
                    return Ok(Authenticator::Basic { username, password });
                }
                _ => {
                    return Err(IamError::Misconfiguration(
                        "credentials carry neither an access token, an API key nor username/password"
                            .to_owned(),
                    ))
                }
            }
        }

        info!("using IAM authentication");
        Ok(Authenticator::Iam(Arc::new(TokenManager::new(manager_config)?)))
    }

    /// Value for the `Authorization` header of the next request.
    pub async fn authorization_header(&self) -> Result<String, IamError> {
        match self {
            Authenticator::Basic { username, password } => {
                Ok(format!("Basic {}", STANDARD.encode(format!("{username}:{password}"))))
            }
            Authenticator::Iam(manager) => Ok(format!("Bearer {}", manager.get_token().await?)),
        }
    }

    pub async fn authenticate(&self, request: RequestBuilder) -> Result<RequestBuilder, IamError> {
        let value = self.authorization_header().await?;
        Ok(request.header(AUTHORIZATION, value))
    }
}
