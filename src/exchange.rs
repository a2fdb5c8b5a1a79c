//! Session exchange against the backend auth endpoints.
//!
//! The exchange client owns every auth-relevant backend call: trading an
//! identity token for a session, the authenticated who-am-I fetch used for
//! revalidation, and remote account deletion. All responses follow the
//! uniform `{data?, message?}` envelope.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::{AccountDeletionError, ExchangeError};
use crate::profile::UserProfile;
use crate::session::SessionContext;
use crate::store::TokenStore;
use crate::token::SessionToken;

/// HTTP request timeout in seconds. Fixed; not exposed as a user setting.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Which backend operation an identity token is exchanged through.
///
/// Sign-in assumes an existing account; sign-up provisions one. The caller
/// always states intent explicitly — the client never infers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeMode {
    SignIn,
    SignUp,
}

impl ExchangeMode {
    fn path(self) -> &'static str {
        match self {
            Self::SignIn => "/auth/google/signin",
            Self::SignUp => "/auth/google/signup",
        }
    }

    fn default_rejection(self) -> &'static str {
        match self {
            Self::SignIn => "Sign in failed",
            Self::SignUp => "Sign up failed",
        }
    }
}

/// Uniform `{data?, message?}` response wrapper used by the backend.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionGrant {
    token: String,
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct ProfileData {
    user: UserProfile,
}

/// Client for the backend's auth-relevant endpoints.
///
/// Clone is cheap: the underlying `reqwest::Client` shares its connection
/// pool and the store/context handles are reference-counted.
#[derive(Clone)]
pub struct ExchangeClient {
    client: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    context: SessionContext,
}

impl ExchangeClient {
    pub fn new(config: &BackendConfig, store: Arc<dyn TokenStore>, context: SessionContext) -> Self {
        Self {
            client: build_client(Duration::from_secs(REQUEST_TIMEOUT_SECS)),
            base_url: config.base_url.clone(),
            store,
            context,
        }
    }

    /// Override the fixed request timeout. Intended for tests.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Exchange an identity token for a session token and profile.
    ///
    /// On success the token is persisted and published to the session
    /// context before this returns, so no caller can observe a successful
    /// exchange whose token is not yet usable. A failed exchange leaves the
    /// store untouched.
    pub async fn exchange(
        &self,
        id_token: &str,
        mode: ExchangeMode,
    ) -> Result<(SessionToken, UserProfile), ExchangeError> {
        let url = format!("{}{}", self.base_url, mode.path());
        let body = serde_json::json!({ "idToken": id_token });
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ExchangeError::from_transport)?;
        let status = resp.status();
        let raw = resp.text().await.map_err(ExchangeError::from_transport)?;
        if !status.is_success() {
            return Err(rejection(status.as_u16(), &raw, mode.default_rejection()));
        }
        let envelope: Envelope<SessionGrant> = serde_json::from_str(&raw).map_err(|err| {
            ExchangeError::TransportIO(format!("malformed exchange response: {err}"))
        })?;
        let grant = envelope
            .data
            .ok_or_else(|| ExchangeError::TransportIO("exchange response missing data".to_string()))?;
        let token = SessionToken::new(grant.token);
        self.context.install(self.store.as_ref(), &token)?;
        debug!(mode = ?mode, user = %grant.user.id, "session established");
        Ok((token, grant.user))
    }

    /// Fetch the current user's profile using the active session token.
    pub async fn fetch_profile(&self) -> Result<UserProfile, ExchangeError> {
        let token = self
            .context
            .current()
            .ok_or_else(|| ExchangeError::Rejected("No active session".to_string()))?;
        let url = format!("{}/user/profile", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, token.as_str())
            .send()
            .await
            .map_err(ExchangeError::from_transport)?;
        let status = resp.status();
        let raw = resp.text().await.map_err(ExchangeError::from_transport)?;
        if !status.is_success() {
            return Err(rejection(status.as_u16(), &raw, "Session is no longer valid"));
        }
        let envelope: Envelope<ProfileData> = serde_json::from_str(&raw).map_err(|err| {
            ExchangeError::TransportIO(format!("malformed profile response: {err}"))
        })?;
        envelope
            .data
            .map(|data| data.user)
            .ok_or_else(|| ExchangeError::TransportIO("profile response missing data".to_string()))
    }

    /// Delete the remote account. Local state is untouched here — the
    /// session manager only clears it once this has succeeded.
    pub async fn delete_account(&self) -> Result<(), AccountDeletionError> {
        let token = self
            .context
            .current()
            .ok_or_else(|| AccountDeletionError::Rejected("No active session".to_string()))?;
        let url = format!("{}/user/account", self.base_url);
        let resp = self
            .client
            .delete(&url)
            .header(AUTHORIZATION, token.as_str())
            .send()
            .await
            .map_err(|err| AccountDeletionError::Transport(ExchangeError::from_transport(err)))?;
        let status = resp.status();
        if status.is_success() {
            debug!("account deleted");
            return Ok(());
        }
        let raw = resp
            .text()
            .await
            .map_err(|err| AccountDeletionError::Transport(ExchangeError::from_transport(err)))?;
        match rejection(status.as_u16(), &raw, "Account deletion failed") {
            ExchangeError::Rejected(message) => Err(AccountDeletionError::Rejected(message)),
            other => Err(AccountDeletionError::Transport(other)),
        }
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("failed to build HTTP client")
}

/// Classify a non-2xx response: a parseable envelope is an application-level
/// rejection, anything else an HTTP-layer protocol failure.
fn rejection(status: u16, raw: &str, fallback: &str) -> ExchangeError {
    match serde_json::from_str::<Envelope<serde_json::Value>>(raw) {
        Ok(envelope) => {
            ExchangeError::Rejected(envelope.message.unwrap_or_else(|| fallback.to_string()))
        }
        Err(_) => ExchangeError::Protocol(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_select_distinct_endpoints() {
        assert_eq!(ExchangeMode::SignIn.path(), "/auth/google/signin");
        assert_eq!(ExchangeMode::SignUp.path(), "/auth/google/signup");
    }

    #[test]
    fn rejection_prefers_envelope_message() {
        let error = rejection(404, r#"{"message":"no account"}"#, "Sign in failed");
        assert!(matches!(error, ExchangeError::Rejected(message) if message == "no account"));
    }

    #[test]
    fn rejection_falls_back_to_mode_default() {
        let error = rejection(400, "{}", "Sign up failed");
        assert!(matches!(error, ExchangeError::Rejected(message) if message == "Sign up failed"));
    }

    #[test]
    fn non_envelope_body_is_a_protocol_failure() {
        let error = rejection(502, "<html>Bad Gateway</html>", "Sign in failed");
        assert!(matches!(error, ExchangeError::Protocol(502)));
    }
}
