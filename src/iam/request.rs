//! IAM token exchange
//!
//! Speaks the issuer's form-encoded grant protocol: mint with an API key,
//! refresh with a refresh token. No retries happen here; every failure is
//! reported once as `IamError::TokenAcquisition`.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, warn};

use crate::cache::token::TokenRecord;
use crate::error::IamError;
use crate::helpers::time::format_unix;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::{GRANT_TYPE_APIKEY, GRANT_TYPE_REFRESH_TOKEN, RESPONSE_TYPE_CLOUD_IAM};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_ACCEPT: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    ApiKey,
    RefreshToken,
}

impl Grant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grant::ApiKey => "apikey",
            Grant::RefreshToken => "refresh_token",
        }
    }
}

#[derive(Debug, Clone)]
pub struct IamClient {
    http: Client,
    url: String,
    authorization: String,
}

impl IamClient {
    pub fn new(url: &str, client_id: &str, client_secret: &str, timeout_ms: u64) -> Result<Self, IamError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| IamError::Misconfiguration(format!("http client: {e}")))?;
        Ok(Self::with_client(http, url, client_id, client_secret))
    }

    pub fn with_client(http: Client, url: &str, client_id: &str, client_secret: &str) -> Self {
        let authorization = format!("Basic {}", STANDARD.encode(format!("{client_id}:{client_secret}")));
        Self { http, url: url.to_owned(), authorization }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Exchange an API key for a brand-new token.
    pub async fn mint(&self, api_key: &str) -> Result<TokenRecord, IamError> {
        let form = [
            ("grant_type", GRANT_TYPE_APIKEY),
            ("apikey", api_key),
            ("response_type", RESPONSE_TYPE_CLOUD_IAM),
        ];
        self.request_token(Grant::ApiKey, &form).await
    }

    /// Exchange a refresh token for a replacement access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenRecord, IamError> {
        let form = [
            ("grant_type", GRANT_TYPE_REFRESH_TOKEN),
            ("refresh_token", refresh_token),
        ];
        self.request_token(Grant::RefreshToken, &form).await
    }

    async fn request_token(&self, grant: Grant, form: &[(&str, &str)]) -> Result<TokenRecord, IamError> {
        let metrics = get_metrics().await;
        let start = tokio::time::Instant::now();
        metrics.token_requests.with_label_values(&[grant.as_str()]).inc();

        let result = self.send(form).await;

        metrics.token_request_duration.with_label_values(&[grant.as_str()]).observe(start.elapsed().as_secs_f64());
        match result {
            Ok(record) => {
                metrics.token_expiry_unix.set(record.expiration_epoch_seconds);
                debug!(
                    "grant '{}' succeeded, token expires at {}",
                    grant.as_str(),
                    format_unix(record.expiration_epoch_seconds)
                );
                Ok(record)
            }
            Err(e) => {
                metrics.token_request_failures.with_label_values(&[grant.as_str()]).inc();
                warn!("grant '{}' failed: {}", grant.as_str(), e);
                Err(e)
            }
        }
    }

    async fn send(&self, form: &[(&str, &str)]) -> Result<TokenRecord, IamError> {
        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(ACCEPT, JSON_ACCEPT)
            .header(AUTHORIZATION, &self.authorization)
            .form(form)
            .send()
            .await
            .map_err(|e| IamError::TokenAcquisition(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IamError::TokenAcquisition(e.to_string()))?;
        if !status.is_success() {
            return Err(IamError::TokenAcquisition(format!("issuer responded {}: {}", status, body)));
        }

        let record: TokenRecord = serde_json::from_str(&body)
            .map_err(|e| IamError::TokenAcquisition(format!("invalid issuer response: {e}")))?;
        if record.access_token.is_empty() {
            return Err(IamError::TokenAcquisition("issuer response has no access_token".to_owned()));
        }
        Ok(record)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    const PATH: &str = "/identity/token";

    fn client(server: &MockServer) -> IamClient {
        IamClient::new(&server.url(PATH), "bx", "bx", 2000).unwrap()
    }

    #[tokio::test]
    async fn mint_sends_apikey_grant_with_sdk_basic_auth() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(PATH)
                    .header("authorization", "Basic Yng6Yng=")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .header("accept", "application/json")
                    .body_includes("grant_type=urn%3Aibm%3Aparams%3Aoauth%3Agrant-type%3Aapikey")
                    .body_includes("apikey=secret-key")
                    .body_includes("response_type=cloud_iam");
                then.status(200).json_body(json!({
                    "access_token": "tok1",
                    "refresh_token": "ref1",
                    "token_type": "Bearer",
                    "expires_in": 3600,
                    "expiration": 1700003600
                }));
            })
            .await;

        let record = client(&server).mint("secret-key").await.unwrap();
        mock.assert_async().await;
        assert_eq!(record.access_token, "tok1");
        assert_eq!(record.refresh_token, "ref1");
        assert_eq!(record.issued_duration_seconds, 3600);
        assert_eq!(record.expiration_epoch_seconds, 1700003600);
    }

    #[tokio::test]
    async fn refresh_sends_refresh_token_grant() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(PATH)
                    .body_includes("grant_type=refresh_token")
                    .body_includes("refresh_token=ref1");
                then.status(200).json_body(json!({
                    "access_token": "tok2",
                    "refresh_token": "ref2",
                    "token_type": "Bearer",
                    "expires_in": 3600,
                    "expiration": 1700007200
                }));
            })
            .await;

        let record = client(&server).refresh("ref1").await.unwrap();
        mock.assert_async().await;
        assert_eq!(record.access_token, "tok2");
    }

    #[tokio::test]
    async fn non_success_status_is_token_acquisition_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(400).body(r#"{"errorMessage":"Provided API key could not be found"}"#);
            })
            .await;

        let err = client(&server).mint("bad").await.unwrap_err();
        match err {
            IamError::TokenAcquisition(msg) => {
                assert!(msg.contains("400"), "{msg}");
                assert!(msg.contains("could not be found"), "{msg}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_token_acquisition_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(200).body("not json");
            })
            .await;

        let err = client(&server).mint("key").await.unwrap_err();
        assert!(matches!(err, IamError::TokenAcquisition(_)));
    }

    #[tokio::test]
    async fn transport_failure_is_token_acquisition_error() {
        // nothing listens on port 9
        let client = IamClient::new("http://127.0.0.1:9/identity/token", "bx", "bx", 500).unwrap();
        let err = client.refresh("ref").await.unwrap_err();
        assert!(matches!(err, IamError::TokenAcquisition(_)));
    }
}
