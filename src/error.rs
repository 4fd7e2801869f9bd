use thiserror::Error;

/// Errors surfaced by the token manager and the credential providers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IamError {
    /// Transport failure, issuer rejection or an unreadable issuer response.
    #[error("token acquisition failed: {0}")]
    TokenAcquisition(String),

    #[error("misconfiguration: {0}")]
    Misconfiguration(String),

    #[error("credentials not found: {0}")]
    CredentialsNotFound(String),
}

impl IamError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, IamError::CredentialsNotFound(_))
    }
}
