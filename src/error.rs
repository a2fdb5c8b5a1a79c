//! Error types for Signet.
//!
//! Each boundary returns its own typed failure; the session manager decides
//! state transitions from them. Nothing in this crate swallows an error
//! except where the contract demands it (claim reading, sign-out).

use thiserror::Error;

/// Failures while obtaining a credential from the broker.
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    /// The user declined or abandoned the credential prompt.
    #[error("Sign-in was cancelled")]
    UserCancelled,

    /// The identity provider could not be reached or answered malformed.
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The broker produced a credential kind the exchange path does not
    /// accept.
    #[error("Unexpected credential type: {0}")]
    UnexpectedType(&'static str),
}

/// Failures of the durable token store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Failures while talking to the backend's auth endpoints.
///
/// Transport variants are classified separately so callers can decide retry
/// policy: timeouts and missing connectivity are worth retrying, a rejection
/// is not.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The fixed request timeout elapsed.
    #[error("Request timed out")]
    Timeout,

    /// A connection to the backend could not be established.
    #[error("No network connection")]
    NoConnection,

    /// Any other transport or wire-format failure.
    #[error("Transport error: {0}")]
    TransportIO(String),

    /// Non-2xx HTTP response without an application-level envelope.
    #[error("Protocol error (status {0})")]
    Protocol(u16),

    /// Application-level rejection; the message is shown to the user
    /// verbatim.
    #[error("{0}")]
    Rejected(String),

    /// The backend accepted the exchange but the token could not be
    /// persisted; success is never reported with a lagging store.
    #[error("Token storage failed: {0}")]
    Storage(#[from] StoreError),
}

impl ExchangeError {
    pub(crate) fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::NoConnection
        } else {
            Self::TransportIO(error.to_string())
        }
    }

    /// Whether retrying the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::NoConnection | Self::TransportIO(_))
    }

    /// A definitive backend verdict, as opposed to a transport fault.
    pub fn is_definitive(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::Protocol(_))
    }
}

/// Failures of the remote account-deletion operation.
#[derive(Debug, Error)]
pub enum AccountDeletionError {
    /// The backend refused the deletion; the message is shown to the user.
    #[error("{0}")]
    Rejected(String),

    /// The deletion request never received a definitive verdict.
    #[error("Account deletion failed: {0}")]
    Transport(#[source] ExchangeError),
}

/// Composite error surfaced by `sign_in` / `sign_up`: the most specific
/// failure from whichever stage failed.
#[derive(Debug, Error)]
pub enum AuthFlowError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}
