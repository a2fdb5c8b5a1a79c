//! Google OAuth 2.0 device-authorization flow.
//!
//! The device flow is the headless analog of a platform credential picker:
//! the user approves the sign-in on a second device while this client polls
//! the token endpoint for the outcome. The whole interaction happens inside
//! one `obtain_credential` call, which suspends until the user settles it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{Credential, CredentialBroker};
use crate::error::CredentialError;

const DEFAULT_DEVICE_CODE_URL: &str = "https://oauth2.googleapis.com/device/code";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Scopes requested for the identity token.
const SCOPES: &str = "openid email profile";

/// Polling interval to fall back to when the provider does not name one.
const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Details the user needs in order to approve the sign-in elsewhere.
#[derive(Debug, Clone)]
pub struct DeviceAuthorization {
    pub verification_url: String,
    pub user_code: String,
    pub expires_at: DateTime<Utc>,
}

type CodeHandler = Arc<dyn Fn(&DeviceAuthorization) + Send + Sync>;

/// Credential broker backed by Google's device-authorization endpoints,
/// configured with a single fixed client identifier.
pub struct GoogleDeviceBroker {
    client: reqwest::Client,
    client_id: String,
    device_code_url: String,
    token_url: String,
    on_code: CodeHandler,
}

impl GoogleDeviceBroker {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            device_code_url: DEFAULT_DEVICE_CODE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            on_code: Arc::new(|authorization: &DeviceAuthorization| {
                tracing::info!(
                    url = %authorization.verification_url,
                    code = %authorization.user_code,
                    "visit the verification URL and enter the code"
                );
            }),
        }
    }

    pub fn with_device_code_url(mut self, url: impl Into<String>) -> Self {
        self.device_code_url = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Override how the verification URL and user code are surfaced to the
    /// user.
    pub fn with_code_handler(
        mut self,
        handler: impl Fn(&DeviceAuthorization) + Send + Sync + 'static,
    ) -> Self {
        self.on_code = Arc::new(handler);
        self
    }

    async fn start_device_flow(&self) -> Result<DeviceSession, CredentialError> {
        let resp = self
            .client
            .post(&self.device_code_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("scope", SCOPES),
            ])
            .send()
            .await
            .map_err(|err| CredentialError::ProviderUnavailable(err.to_string()))?;
        if !resp.status().is_success() {
            return Err(CredentialError::ProviderUnavailable(format!(
                "device code request failed with status {}",
                resp.status()
            )));
        }
        let payload: DeviceCodeResponse = resp
            .json()
            .await
            .map_err(|err| CredentialError::ProviderUnavailable(err.to_string()))?;
        let expires_at = Utc::now() + chrono::Duration::seconds(payload.expires_in as i64);
        debug!(code = %payload.user_code, "device flow started");
        Ok(DeviceSession {
            authorization: DeviceAuthorization {
                verification_url: payload.verification_url,
                user_code: payload.user_code,
                expires_at,
            },
            device_code: payload.device_code,
            interval: Duration::from_secs(payload.interval.unwrap_or(DEFAULT_INTERVAL_SECS)),
        })
    }

    async fn poll_until_settled(
        &self,
        mut session: DeviceSession,
    ) -> Result<Credential, CredentialError> {
        loop {
            if Utc::now() >= session.authorization.expires_at {
                return Err(CredentialError::ProviderUnavailable(
                    "device code expired before approval".to_string(),
                ));
            }
            tokio::time::sleep(session.interval).await;
            match self.poll_once(&session.device_code).await? {
                GrantPoll::Pending => {}
                GrantPoll::SlowDown => {
                    session.interval += Duration::from_secs(2);
                }
                GrantPoll::Denied => return Err(CredentialError::UserCancelled),
                GrantPoll::Expired => {
                    return Err(CredentialError::ProviderUnavailable(
                        "device code expired before approval".to_string(),
                    ));
                }
                GrantPoll::Settled(credential) => return Ok(credential),
            }
        }
    }

    async fn poll_once(&self, device_code: &str) -> Result<GrantPoll, CredentialError> {
        let resp = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("device_code", device_code),
                ("grant_type", DEVICE_GRANT_TYPE),
            ])
            .send()
            .await
            .map_err(|err| CredentialError::ProviderUnavailable(err.to_string()))?;
        // Google reports pending/denied as non-2xx statuses with a JSON
        // error body, so the payload is decoded regardless of status.
        let status = resp.status();
        let payload: DeviceTokenResponse = resp
            .json()
            .await
            .map_err(|err| CredentialError::ProviderUnavailable(err.to_string()))?;
        if let Some(id_token) = payload.id_token {
            return Ok(GrantPoll::Settled(Credential::IdToken(id_token)));
        }
        if let Some(access_token) = payload.access_token {
            warn!("device grant returned an access token without an id_token");
            return Ok(GrantPoll::Settled(Credential::AccessToken(access_token)));
        }
        match payload.error.as_deref() {
            Some("authorization_pending") => Ok(GrantPoll::Pending),
            Some("slow_down") => Ok(GrantPoll::SlowDown),
            Some("access_denied") => Ok(GrantPoll::Denied),
            Some("expired_token") => Ok(GrantPoll::Expired),
            Some(other) => Err(CredentialError::ProviderUnavailable(format!(
                "device grant error: {other}"
            ))),
            None => Err(CredentialError::ProviderUnavailable(format!(
                "device grant response missing token and error (status {status})"
            ))),
        }
    }
}

#[async_trait]
impl CredentialBroker for GoogleDeviceBroker {
    async fn obtain_credential(&self) -> Result<Credential, CredentialError> {
        let session = self.start_device_flow().await?;
        (self.on_code)(&session.authorization);
        self.poll_until_settled(session).await
    }
}

struct DeviceSession {
    authorization: DeviceAuthorization,
    device_code: String,
    interval: Duration,
}

enum GrantPoll {
    Pending,
    SlowDown,
    Denied,
    Expired,
    Settled(Credential),
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    #[serde(alias = "verification_uri")]
    verification_url: String,
    expires_in: u64,
    interval: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DeviceTokenResponse {
    id_token: Option<String>,
    access_token: Option<String>,
    error: Option<String>,
}
