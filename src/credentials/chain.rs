use tracing::{debug, info};

use crate::config::types::{CredentialsConfig, ProviderKind, DEFAULT_PROVIDERS};
use crate::credentials::{CredentialProvider, Credentials, EnvProvider, ServiceBindingProvider, StaticProvider};
use crate::error::IamError;

/// First provider that resolves wins. Errors other than "not found" stop the chain.
#[derive(Debug, Default)]
pub struct ChainProvider {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainProvider {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// Providers in the configured order.
    pub fn from_config(config: &CredentialsConfig) -> Self {
        let kinds = config.providers.as_deref().unwrap_or(&DEFAULT_PROVIDERS);
        let providers = kinds
            .iter()
            .map(|kind| -> Box<dyn CredentialProvider> {
                match kind {
                    ProviderKind::Static => Box::new(StaticProvider(config.values.clone())),
                    ProviderKind::Env => Box::new(EnvProvider::new(&config.service_name)),
                    ProviderKind::ServiceBinding => Box::new(ServiceBindingProvider::new(
                        &config.service_name,
                        config.binding_path.clone(),
                    )),
                }
            })
            .collect();
        Self::new(providers)
    }

    pub fn push(&mut self, provider: Box<dyn CredentialProvider>) {
        self.providers.push(provider);
    }
}

impl CredentialProvider for ChainProvider {
    fn name(&self) -> &str {
        "chain"
    }

    fn resolve(&self) -> Result<Credentials, IamError> {
        for provider in &self.providers {
            match provider.resolve() {
                Ok(credentials) => {
                    info!("credentials provided by '{}'", provider.name());
                    return Ok(credentials);
                }
                Err(e) if e.is_not_found() => debug!("provider '{}': {}", provider.name(), e),
                Err(e) => return Err(e),
            }
        }
        let tried: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        Err(IamError::CredentialsNotFound(format!("tried providers {:?}", tried)))
    }
}
