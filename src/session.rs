//! Session lifecycle orchestration.
//!
//! [`SessionManager`] coordinates the credential broker, the exchange
//! client, and the token store into one state machine, and is the single
//! object the embedding application queries for "am I logged in" and "who
//! am I". Token presence never implies authenticated: every validation path
//! is prepared to downgrade to [`SessionState::NoSession`].

use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::broker::{Credential, CredentialBroker};
use crate::claims::read_claims;
use crate::config::BackendConfig;
use crate::error::{AccountDeletionError, AuthFlowError, CredentialError, StoreError};
use crate::exchange::{ExchangeClient, ExchangeMode};
use crate::profile::UserProfile;
use crate::store::TokenStore;
use crate::token::SessionToken;

/// Thread-safe holder of the outbound-authorization token.
///
/// Explicitly injected into everything that reads or writes the active
/// token, so concurrent sessions in tests never share state by accident.
/// Clone is cheap and clones observe the same value.
#[derive(Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<SessionToken>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-suspending read of the active token.
    pub fn current(&self) -> Option<SessionToken> {
        let guard = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clone()
    }

    pub fn set(&self, token: SessionToken) {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(token);
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
    }

    /// Persist `token` and publish it here under a single write lock, so no
    /// reader observes the store and the context disagreeing.
    pub(crate) fn install(
        &self,
        store: &dyn TokenStore,
        token: &SessionToken,
    ) -> Result<(), StoreError> {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        store.save(token)?;
        *guard = Some(token.clone());
        Ok(())
    }
}

/// Lifecycle states of the identity session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoSession,
    CredentialPending,
    Exchanging,
    Active,
    Revalidating,
    LoggingOut,
}

/// Orchestrates establish, restore, validate, and terminate for the
/// identity session.
pub struct SessionManager {
    broker: Arc<dyn CredentialBroker>,
    store: Arc<dyn TokenStore>,
    context: SessionContext,
    client: ExchangeClient,
    state: RwLock<SessionState>,
    profile: RwLock<Option<UserProfile>>,
}

impl SessionManager {
    pub fn new(
        config: &BackendConfig,
        broker: Arc<dyn CredentialBroker>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        let context = SessionContext::new();
        let client = ExchangeClient::new(config, store.clone(), context.clone());
        Self {
            broker,
            store,
            context,
            client,
            state: RwLock::new(SessionState::NoSession),
            profile: RwLock::new(None),
        }
    }

    /// Current lifecycle state. For "am I logged in", prefer
    /// [`Self::is_authenticated`], which revalidates against the backend.
    pub fn state(&self) -> SessionState {
        *self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Last profile snapshot seen from the backend.
    pub fn profile(&self) -> Option<UserProfile> {
        self.profile
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The shared outbound-authorization holder.
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Sign in to an existing account.
    pub async fn sign_in(&self) -> Result<UserProfile, AuthFlowError> {
        self.authenticate(ExchangeMode::SignIn).await
    }

    /// Provision a new account.
    pub async fn sign_up(&self) -> Result<UserProfile, AuthFlowError> {
        self.authenticate(ExchangeMode::SignUp).await
    }

    async fn authenticate(&self, mode: ExchangeMode) -> Result<UserProfile, AuthFlowError> {
        self.set_state(SessionState::CredentialPending);
        let credential = match self.broker.obtain_credential().await {
            Ok(credential) => credential,
            Err(err) => {
                self.set_state(SessionState::NoSession);
                return Err(err.into());
            }
        };
        let id_token = match credential {
            Credential::IdToken(token) => token,
            other => {
                self.set_state(SessionState::NoSession);
                return Err(CredentialError::UnexpectedType(other.kind()).into());
            }
        };
        let claims = read_claims(&id_token);
        debug!(%claims, "identity token claims");
        self.set_state(SessionState::Exchanging);
        match self.client.exchange(&id_token, mode).await {
            Ok((_token, profile)) => {
                self.set_profile(Some(profile.clone()));
                self.set_state(SessionState::Active);
                Ok(profile)
            }
            Err(err) => {
                self.set_state(SessionState::NoSession);
                Err(err.into())
            }
        }
    }

    /// Rebuild the session from the durable store and revalidate it against
    /// the backend.
    ///
    /// With nothing stored this settles to `NoSession` without a network
    /// call. Revalidation failures are silent — the caller observes only
    /// the resulting state. A definitive backend rejection also purges the
    /// stored token; transport failures retain it so a flaky network never
    /// destroys a valid session.
    pub async fn restore_session(&self) -> SessionState {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "failed to read token store");
                self.set_state(SessionState::NoSession);
                return SessionState::NoSession;
            }
        };
        let Some(token) = stored else {
            self.set_state(SessionState::NoSession);
            return SessionState::NoSession;
        };
        self.context.set(token);
        self.set_state(SessionState::Revalidating);
        match self.client.fetch_profile().await {
            Ok(profile) => {
                self.set_profile(Some(profile));
                self.set_state(SessionState::Active);
                SessionState::Active
            }
            Err(err) => {
                self.context.clear();
                self.set_profile(None);
                if err.is_definitive() {
                    if let Err(store_err) = self.store.clear() {
                        warn!(error = %store_err, "failed to purge rejected token");
                    }
                }
                warn!(error = %err, "session revalidation failed");
                self.set_state(SessionState::NoSession);
                SessionState::NoSession
            }
        }
    }

    /// Whether a live, backend-confirmed session exists. Always revalidates
    /// rather than trusting stored-token presence.
    pub async fn is_authenticated(&self) -> bool {
        self.restore_session().await == SessionState::Active
    }

    /// Terminate the session locally. Makes no network call and always
    /// settles to `NoSession`.
    pub async fn sign_out(&self) {
        self.set_state(SessionState::LoggingOut);
        self.context.clear();
        self.set_profile(None);
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear token store during sign-out");
        }
        self.set_state(SessionState::NoSession);
    }

    /// Delete the remote account, then clear local state.
    ///
    /// On failure the session stays `Active` and the token is retained, so
    /// the user is not silently logged out while the remote account still
    /// exists.
    pub async fn delete_account(&self) -> Result<(), AccountDeletionError> {
        self.client.delete_account().await?;
        self.context.clear();
        self.set_profile(None);
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear token store after account deletion");
        }
        self.set_state(SessionState::NoSession);
        Ok(())
    }

    fn set_state(&self, next: SessionState) {
        let mut guard = self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *guard != next {
            debug!(from = ?*guard, to = ?next, "session state");
            *guard = next;
        }
    }

    fn set_profile(&self, value: Option<UserProfile>) {
        let mut guard = self
            .profile
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = value;
    }
}
