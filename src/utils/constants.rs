//! Shared constants and invariants

pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;

/// Public client identifier of the SDK, not of the caller.
pub const DEFAULT_IAM_CLIENT_ID: &str = "bx";
pub const DEFAULT_IAM_CLIENT_SECRET: &str = "bx";

// Grant bodies
pub const GRANT_TYPE_APIKEY: &str = "urn:ibm:params:oauth:grant-type:apikey";
pub const GRANT_TYPE_REFRESH_TOKEN: &str = "refresh_token";
pub const RESPONSE_TYPE_CLOUD_IAM: &str = "cloud_iam";

/// Share of the token lifetime after which the token is refreshed.
pub const REFRESH_AFTER_PERCENT: i64 = 80;
/// Refresh tokens are presumed valid for 7 days past the access token expiration.
pub const REFRESH_TOKEN_LIFETIME_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Username that marks the password as an IAM API key.
pub const APIKEY_USERNAME: &str = "apikey";

pub const VCAP_SERVICES_ENV: &str = "VCAP_SERVICES";
