use std::collections::HashMap;
use std::path::PathBuf;
use std::{env, fs};

use serde::Deserialize;
use tracing::debug;

use crate::credentials::{CredentialProvider, Credentials};
use crate::error::IamError;
use crate::utils::constants::VCAP_SERVICES_ENV;

#[derive(Debug, Deserialize)]
struct BindingEntry {
    #[serde(default)]
    credentials: Credentials,
}

/// Mounted service-binding document: `{ "<service>": [ { "credentials": {...} } ] }`.
///
/// Read from a file when a path is given, otherwise from `VCAP_SERVICES`.
#[derive(Debug, Clone)]
pub struct ServiceBindingProvider {
    service_name: String,
    path: Option<PathBuf>,
}

impl ServiceBindingProvider {
    pub fn new(service_name: &str, path: Option<PathBuf>) -> Self {
        Self { service_name: service_name.to_owned(), path }
    }

    fn document(&self) -> Result<Option<String>, IamError> {
        match &self.path {
            Some(path) => fs::read_to_string(path).map(Some).map_err(|e| {
                IamError::Misconfiguration(format!("cannot read binding file {}: {}", path.display(), e))
            }),
            None => Ok(env::var(VCAP_SERVICES_ENV).ok().filter(|v| !v.trim().is_empty())),
        }
    }
}

impl CredentialProvider for ServiceBindingProvider {
    fn name(&self) -> &str {
        "service_binding"
    }

    fn resolve(&self) -> Result<Credentials, IamError> {
        let not_found = || IamError::CredentialsNotFound(format!("no binding for service '{}'", self.service_name));

        let document = self.document()?.ok_or_else(not_found)?;
        let bindings: HashMap<String, Vec<BindingEntry>> = serde_json::from_str(&document)
            .map_err(|e| IamError::Misconfiguration(format!("invalid service binding document: {e}")))?;

        let credentials = bindings
            .get(&self.service_name)
            .and_then(|entries| entries.first())
            .map(|entry| entry.credentials.clone())
            .filter(Credentials::is_usable)
            .ok_or_else(not_found)?;
        debug!("credentials resolved from service binding '{}'", self.service_name);
        Ok(credentials)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const DOC: &str = r#"{
        "speech_to_text": [
            { "name": "stt-1", "credentials": { "apikey": "k1", "url": "https://stt.example.com" } },
            { "name": "stt-2", "credentials": { "apikey": "k2" } }
        ],
        "personality_insights": [
            { "credentials": { "username": "u", "password": "p" } }
        ],
        "visual_recognition": [
            { "credentials": { "iam_apikey": "vr-key", "iam_url": "https://iam.example.com/identity/token" } }
        ]
    }"#;

    #[test]
    fn reads_first_binding_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOC.as_bytes()).unwrap();

        let provider = ServiceBindingProvider::new("speech_to_text", Some(file.path().to_path_buf()));
        let creds = provider.resolve().unwrap();
        assert_eq!(creds.apikey.as_deref(), Some("k1"));
        assert_eq!(creds.url.as_deref(), Some("https://stt.example.com"));
    }

    #[test]
    fn iam_apikey_alias_is_accepted() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOC.as_bytes()).unwrap();

        let provider = ServiceBindingProvider::new("visual_recognition", Some(file.path().to_path_buf()));
        let creds = provider.resolve().unwrap();
        assert_eq!(creds.apikey.as_deref(), Some("vr-key"));
        assert_eq!(creds.iam_url.as_deref(), Some("https://iam.example.com/identity/token"));
    }

    #[test]
    #[serial]
    fn reads_vcap_services_env() {
        env::set_var(VCAP_SERVICES_ENV, DOC);
        let creds = ServiceBindingProvider::new("personality_insights", None).resolve().unwrap();
        assert_eq!(creds.username.as_deref(), Some("u"));
        assert_eq!(creds.password.as_deref(), Some("p"));

        let err = ServiceBindingProvider::new("unknown_service", None).resolve().unwrap_err();
        assert!(err.is_not_found());
        env::remove_var(VCAP_SERVICES_ENV);
    }

    #[test]
    #[serial]
    fn absent_env_is_not_found() {
        env::remove_var(VCAP_SERVICES_ENV);
        let err = ServiceBindingProvider::new("speech_to_text", None).resolve().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn broken_document_is_misconfiguration() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let err = ServiceBindingProvider::new("speech_to_text", Some(file.path().to_path_buf()))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, IamError::Misconfiguration(_)));
    }
}
