#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use signet::broker::{Credential, CredentialBroker};
use signet::error::{CredentialError, StoreError};
use signet::store::TokenStore;
use signet::token::SessionToken;

/// Token store kept entirely in memory.
#[derive(Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<SessionToken>>,
    saves: Mutex<u32>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, token: &str) {
        *self.token.lock().expect("store lock poisoned") = Some(SessionToken::new(token));
    }

    pub fn get(&self) -> Option<SessionToken> {
        self.token.lock().expect("store lock poisoned").clone()
    }

    pub fn save_count(&self) -> u32 {
        *self.saves.lock().expect("store lock poisoned")
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<SessionToken>, StoreError> {
        Ok(self.get())
    }

    fn save(&self, token: &SessionToken) -> Result<(), StoreError> {
        *self.saves.lock().expect("store lock poisoned") += 1;
        *self.token.lock().expect("store lock poisoned") = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.token.lock().expect("store lock poisoned") = None;
        Ok(())
    }

    fn peek(&self) -> Option<SessionToken> {
        self.get()
    }
}

/// Broker that immediately yields a fixed outcome.
pub struct StaticBroker {
    result: Result<Credential, CredentialError>,
}

impl StaticBroker {
    pub fn id_token(token: &str) -> Self {
        Self {
            result: Ok(Credential::IdToken(token.to_string())),
        }
    }

    pub fn credential(credential: Credential) -> Self {
        Self {
            result: Ok(credential),
        }
    }

    pub fn failing(error: CredentialError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl CredentialBroker for StaticBroker {
    async fn obtain_credential(&self) -> Result<Credential, CredentialError> {
        self.result.clone()
    }
}

/// Success body for the exchange endpoints.
pub fn grant_body(token: &str) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "token": token,
            "user": {
                "id": "u-1",
                "email": "u@x.com",
                "name": "Uma Example",
                "bio": "hello"
            }
        }
    })
}

/// Success body for the who-am-I endpoint.
pub fn profile_body() -> serde_json::Value {
    serde_json::json!({
        "data": {
            "user": {
                "id": "u-1",
                "email": "u@x.com",
                "name": "Uma Example"
            }
        }
    })
}
