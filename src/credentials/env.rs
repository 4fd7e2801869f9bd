use std::env;

use tracing::debug;

use crate::credentials::{env_prefix, CredentialProvider, Credentials};
use crate::error::IamError;

/// Reads `<SERVICE>_APIKEY`, `<SERVICE>_IAM_APIKEY`, `<SERVICE>_BEARER_TOKEN`,
/// `<SERVICE>_USERNAME`, `<SERVICE>_PASSWORD`, `<SERVICE>_URL` and `<SERVICE>_IAM_URL`.
#[derive(Debug, Clone)]
pub struct EnvProvider {
    prefix: String,
}

impl EnvProvider {
    pub fn new(service_name: &str) -> Self {
        Self { prefix: env_prefix(service_name) }
    }

    fn var(&self, suffix: &str) -> Option<String> {
        env::var(format!("{}_{}", self.prefix, suffix))
            .ok()
            .filter(|v| !v.is_empty())
    }
}

impl CredentialProvider for EnvProvider {
    fn name(&self) -> &str {
        "env"
    }

    fn resolve(&self) -> Result<Credentials, IamError> {
        let credentials = Credentials {
            apikey: self.var("APIKEY").or_else(|| self.var("IAM_APIKEY")),
            access_token: self.var("BEARER_TOKEN"),
            username: self.var("USERNAME"),
            password: self.var("PASSWORD"),
            url: self.var("URL"),
            iam_url: self.var("IAM_URL"),
        };
        if !credentials.is_usable() {
            return Err(IamError::CredentialsNotFound(format!(
                "no {}_* credentials in environment",
                self.prefix
            )));
        }
        debug!("credentials resolved from {}_* environment variables", self.prefix);
        Ok(credentials)
    }
}
