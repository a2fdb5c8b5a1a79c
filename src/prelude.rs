//! Convenience re-exports for common use.

pub use crate::broker::{Credential, CredentialBroker, GoogleDeviceBroker};
pub use crate::claims::{read_claims, IdentityClaims};
pub use crate::config::BackendConfig;
pub use crate::error::{
    AccountDeletionError, AuthFlowError, CredentialError, ExchangeError, StoreError,
};
pub use crate::exchange::{ExchangeClient, ExchangeMode};
pub use crate::profile::UserProfile;
pub use crate::session::{SessionContext, SessionManager, SessionState};
pub use crate::store::{FileTokenStore, TokenStore, TokenStoreConfig};
pub use crate::token::SessionToken;
