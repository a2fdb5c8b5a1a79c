//! Credential acquisition from the identity provider.
//!
//! The broker is the seam between this crate and whatever surface the user
//! actually approves the sign-in on. It never touches the token store.

pub mod device_flow;

pub use device_flow::{DeviceAuthorization, GoogleDeviceBroker};

use std::fmt;

use async_trait::async_trait;

use crate::error::CredentialError;

/// A credential produced by a broker.
///
/// Brokers are capability-polymorphic: depending on what the user picks they
/// may yield kinds other than an identity token. The exchange path accepts
/// only [`Credential::IdToken`] and rejects every other kind uniformly.
/// Credentials are ephemeral — owned by the in-progress sign-in attempt and
/// dropped after the exchange settles.
#[derive(Clone)]
pub enum Credential {
    /// Identity token asserting who the user is; exchanged with the backend.
    IdToken(String),
    /// Provider access token without an embedded identity assertion.
    AccessToken(String),
    /// Stored username/password pair.
    Password { username: String, password: String },
}

impl Credential {
    /// Short label used in diagnostics and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IdToken(_) => "id-token",
            Self::AccessToken(_) => "access-token",
            Self::Password { .. } => "password",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secrets stay out of logs; the kind is all diagnostics need.
        write!(f, "Credential({})", self.kind())
    }
}

/// Source of user credentials.
///
/// Implementations may suspend for arbitrary user-interaction time.
#[async_trait]
pub trait CredentialBroker: Send + Sync {
    async fn obtain_credential(&self) -> Result<Credential, CredentialError>;
}
