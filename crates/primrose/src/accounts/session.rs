//! Opaque bearer-token sessions.
//!
//! Tokens are random and server-side only, so logout genuinely revokes
//! access instead of waiting for an expiry to pass.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::store::StoreError;

use super::domain::UserId;

pub trait SessionStore: Send + Sync {
    /// Mint a fresh token bound to the user.
    fn create(&self, user: UserId) -> Result<String, StoreError>;
    /// Look up the user a token belongs to, if the token is live.
    fn resolve(&self, token: &str) -> Result<Option<UserId>, StoreError>;
    /// Drop the token. Revoking an unknown token is not an error.
    fn revoke(&self, token: &str) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, UserId>>,
}

impl InMemorySessionStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, UserId>>, StoreError> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::Unavailable("session store mutex poisoned".to_string()))
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, user: UserId) -> Result<String, StoreError> {
        let token = Uuid::new_v4().simple().to_string();
        self.lock()?.insert(token.clone(), user);
        Ok(token)
    }

    fn resolve(&self, token: &str) -> Result<Option<UserId>, StoreError> {
        Ok(self.lock()?.get(token).copied())
    }

    fn revoke(&self, token: &str) -> Result<(), StoreError> {
        self.lock()?.remove(token);
        Ok(())
    }
}
