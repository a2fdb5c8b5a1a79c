//! Signet — identity-session client SDK.
//!
//! Obtains a Google identity credential, exchanges it for a backend session
//! token, persists that token across process restarts, and revalidates the
//! session on demand. [`session::SessionManager`] is the single entry point
//! the embedding application queries for "am I logged in" and "who am I".
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use signet::broker::GoogleDeviceBroker;
//! use signet::config::BackendConfig;
//! use signet::session::SessionManager;
//! use signet::store::FileTokenStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BackendConfig::from_env();
//! let broker = Arc::new(GoogleDeviceBroker::new(config.google_client_id.clone()));
//! let store = Arc::new(FileTokenStore::new_default());
//! let manager = SessionManager::new(&config, broker, store);
//!
//! let profile = manager.sign_in().await?;
//! println!("signed in as {}", profile.email);
//! # Ok(())
//! # }
//! ```

pub mod broker;
pub mod claims;
pub mod config;
pub mod error;
pub mod exchange;
pub mod prelude;
pub mod profile;
pub mod session;
pub mod store;
pub mod token;
