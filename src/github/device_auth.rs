//! OAuth Device Flow authentication for GitHub
//!
//! Implements the OAuth 2.0 Device Authorization Grant flow for CLI
//! authentication.
//! See: https://docs.github.com/en/apps/oauth-apps/building-oauth-apps/authorizing-oauth-apps#device-flow

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{GitrelError, Result};
use crate::github::request;

/// Default GitHub OAuth App Client ID for gitrel
///
/// Client IDs are intentionally public; OAuth apps carry no secret in the
/// device flow. Override via config or `GITREL_CLIENT_ID`.
pub const DEFAULT_CLIENT_ID: &str = "Iv1.8d6c2f0e5a1b4c3a";

/// GitHub device authorization endpoint
const DEVICE_CODE_URL: &str = "https://github.com/login/device/code";

/// GitHub OAuth token endpoint
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

/// OAuth scope required to create releases
const OAUTH_SCOPE: &str = "repo";

/// Device flow grant type identifier
const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Extra wait added to every poll tick so we never poll faster than the
/// provider-mandated interval.
const POLL_GRACE: Duration = Duration::from_secs(1);

/// Per-request timeout; the outer deadline still governs the whole flow
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client with a per-request timeout applied
pub(crate) fn http_client() -> Result<Client> {
    Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// Endpoint and client configuration for the device flow
///
/// Passed explicitly into [`DeviceFlowAuth::new`]; endpoints are only
/// overridden in tests.
#[derive(Debug, Clone)]
pub struct DeviceAuthConfig {
    /// OAuth App client id
    pub client_id: String,
    /// Requested scope; empty means "omit the parameter"
    pub scope: String,
    /// Device authorization endpoint
    pub device_auth_url: String,
    /// Token endpoint polled for the grant
    pub token_url: String,
}

impl Default for DeviceAuthConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            scope: OAUTH_SCOPE.to_string(),
            device_auth_url: DEVICE_CODE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
        }
    }
}

impl DeviceAuthConfig {
    /// Config with a caller-supplied client id and default GitHub endpoints
    pub fn with_client_id(client_id: String) -> Self {
        Self {
            client_id,
            ..Self::default()
        }
    }
}

/// Device code response as the authorization endpoint sends it
#[derive(Debug, Deserialize)]
struct DeviceAuthorizationWire {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    interval: u64,
}

/// Device authorization codes plus their fixed expiry deadline
#[derive(Debug, Clone)]
pub struct DeviceAuthorization {
    /// The device verification code, used only by the polling step
    pub device_code: String,
    /// The user-facing code to enter on the verification page
    pub user_code: String,
    /// The URL where users should enter the code
    pub verification_uri: String,
    /// Time in seconds until the codes expire
    pub expires_in: u64,
    /// Minimum polling interval in seconds
    pub interval: u64,
    /// Absolute expiry, pinned the moment the codes were received; time
    /// spent between issuance and the first poll counts against it
    pub deadline: Instant,
}

/// Bearer credential obtained from a successful poll
///
/// Held in memory only; never written to disk.
#[derive(Debug, Clone)]
pub struct AccessToken {
    access_token: SecretString,
    token_type: String,
    scope: String,
}

impl AccessToken {
    /// Value for the `Authorization` header: `<token_type> <access_token>`
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token.expose_secret())
    }

    /// Granted scope (informational)
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Token type, typically "bearer"
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    #[cfg(test)]
    pub(crate) fn test_value(access_token: &str, token_type: &str, scope: &str) -> Self {
        Self {
            access_token: SecretString::from(access_token.to_string()),
            token_type: token_type.to_string(),
            scope: scope.to_string(),
        }
    }
}

/// Provider error codes for an unsuccessful poll, decoded straight from the
/// JSON `error` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PollErrorCode {
    AuthorizationPending,
    SlowDown,
    ExpiredToken,
    AccessDenied,
    IncorrectDeviceCode,
    IncorrectClientCredentials,
    UnsupportedGrantType,
}

/// Raw token endpoint response; either a token or an error code
#[derive(Debug, Deserialize)]
struct TokenPollResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    scope: Option<String>,
    error: Option<PollErrorCode>,
    /// New minimum interval, supplied alongside `slow_down`
    interval: Option<u64>,
}

/// Non-terminal outcome of one poll attempt
#[derive(Debug)]
enum PollOutcome {
    Authorized(AccessToken),
    Pending,
    SlowDown { retry_interval: Option<u64> },
}

/// OAuth Device Flow authentication handler
pub struct DeviceFlowAuth {
    client: Client,
    config: DeviceAuthConfig,
}

impl DeviceFlowAuth {
    /// Create a new device flow auth handler
    pub fn new(config: DeviceAuthConfig) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            config,
        })
    }

    /// Request a device code and user code from the provider
    ///
    /// A non-success status aborts the flow; each invocation requests fresh
    /// single-use codes.
    pub async fn request_device_code(&self) -> Result<DeviceAuthorization> {
        let mut params = vec![("client_id", self.config.client_id.as_str())];
        if !self.config.scope.is_empty() {
            params.push(("scope", self.config.scope.as_str()));
        }

        let request =
            request::post_form(&self.client, &self.config.device_auth_url, &params, None)?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GitrelError::DeviceAuthInitiation(status.to_string()));
        }

        let wire: DeviceAuthorizationWire = response
            .json()
            .await
            .map_err(|e| GitrelError::Protocol(e.to_string()))?;

        let codes = DeviceAuthorization {
            deadline: Instant::now() + Duration::from_secs(wire.expires_in),
            device_code: wire.device_code,
            user_code: wire.user_code,
            verification_uri: wire.verification_uri,
            expires_in: wire.expires_in,
            interval: wire.interval,
        };

        debug!(
            expires_in = codes.expires_in,
            interval = codes.interval,
            "received device authorization codes"
        );
        Ok(codes)
    }

    /// Poll the token endpoint until the user authorizes, a fatal error
    /// code is returned, or the device code deadline passes
    pub async fn poll_for_token(&self, codes: &DeviceAuthorization) -> Result<AccessToken> {
        let client = self.client.clone();
        let token_url = self.config.token_url.clone();
        let params = [
            ("client_id".to_string(), self.config.client_id.clone()),
            ("device_code".to_string(), codes.device_code.clone()),
            ("grant_type".to_string(), DEVICE_GRANT_TYPE.to_string()),
        ];

        drive_poll(codes.deadline, codes.interval, move || {
            let client = client.clone();
            let token_url = token_url.clone();
            let params = params.clone();
            async move { poll_once(&client, &token_url, &params).await }
        })
        .await
    }
}

/// Submit one token request and classify the response
async fn poll_once(
    client: &Client,
    token_url: &str,
    params: &[(String, String)],
) -> Result<PollOutcome> {
    let pairs: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let request = request::post_form(client, token_url, &pairs, None)?;
    let response = client.execute(request).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(GitrelError::Transport(status.to_string()));
    }

    let body: TokenPollResponse = response
        .json()
        .await
        .map_err(|e| GitrelError::Protocol(e.to_string()))?;
    classify(body)
}

/// Map a decoded token response onto the poll state machine
fn classify(response: TokenPollResponse) -> Result<PollOutcome> {
    match response.error {
        None => match response.access_token {
            Some(token) if !token.is_empty() => Ok(PollOutcome::Authorized(AccessToken {
                access_token: SecretString::from(token),
                token_type: response.token_type.unwrap_or_else(|| "bearer".to_string()),
                scope: response.scope.unwrap_or_default(),
            })),
            _ => Err(GitrelError::Protocol(
                "token response carried neither a token nor an error".to_string(),
            )),
        },
        Some(PollErrorCode::AuthorizationPending) => Ok(PollOutcome::Pending),
        Some(PollErrorCode::SlowDown) => Ok(PollOutcome::SlowDown {
            retry_interval: response.interval,
        }),
        Some(PollErrorCode::ExpiredToken) => Err(GitrelError::AuthorizationExpired),
        Some(PollErrorCode::AccessDenied) => Err(GitrelError::AuthorizationDenied),
        Some(PollErrorCode::IncorrectDeviceCode) => Err(GitrelError::IncorrectDeviceCode),
        Some(PollErrorCode::IncorrectClientCredentials) => {
            Err(GitrelError::IncorrectClientCredentials)
        }
        Some(PollErrorCode::UnsupportedGrantType) => Err(GitrelError::UnsupportedGrantType),
    }
}

/// The polling loop proper
///
/// Waits `interval + 1` seconds between attempts, escalating the interval on
/// `slow_down` (never decreasing it). The deadline was fixed when the codes
/// were issued and is raced against both the inter-poll wait and the
/// in-flight poll, so a hung request cannot mask a timeout.
async fn drive_poll<F, Fut>(deadline: Instant, interval: u64, mut poll: F) -> Result<AccessToken>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollOutcome>>,
{
    let expiry = tokio::time::sleep_until(deadline);
    tokio::pin!(expiry);
    let mut interval = Duration::from_secs(interval);

    loop {
        tokio::select! {
            _ = &mut expiry => return Err(GitrelError::AuthorizationTimedOut),
            _ = tokio::time::sleep(interval + POLL_GRACE) => {}
        }

        tokio::select! {
            _ = &mut expiry => return Err(GitrelError::AuthorizationTimedOut),
            outcome = poll() => match outcome? {
                PollOutcome::Authorized(token) => {
                    info!("device authorized");
                    return Ok(token);
                }
                PollOutcome::Pending => {
                    debug!("authorization pending");
                }
                PollOutcome::SlowDown { retry_interval } => {
                    // interval only ever grows; take the provider's value
                    // when it is the larger of the two
                    let floor = interval + Duration::from_secs(1);
                    interval = retry_interval
                        .map(Duration::from_secs)
                        .unwrap_or(floor)
                        .max(floor);
                    debug!(interval_secs = interval.as_secs(), "slow_down received");
                }
            },
        }
    }
}
