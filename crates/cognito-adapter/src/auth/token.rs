/*
[INPUT]:  Bearer tokens obtained from login
[OUTPUT]: Shared credential storage with newest-wins replacement
[POS]:    Auth layer - credential lifecycle management
[UPDATE]: When changing storage strategy or credential metadata
*/

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

/// Bearer token plus the metadata needed to order competing acquisitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    username: String,
    obtained_at: DateTime<Utc>,
}

impl Credential {
    /// Create a credential stamped with the current time
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
            obtained_at: Utc::now(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn obtained_at(&self) -> DateTime<Utc> {
        self.obtained_at
    }
}

/// Thread-safe credential store shared by every clone of a session
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    data: Arc<RwLock<Option<Credential>>>,
}

impl TokenStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached credential if available
    pub fn get(&self) -> Option<Credential> {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    /// Store a credential unless a more recently obtained one is already cached.
    ///
    /// Returns `true` when the store now holds `credential`.
    pub fn replace(&self, credential: Credential) -> bool {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = guard.as_ref() {
            if current.obtained_at > credential.obtained_at {
                return false;
            }
        }
        *guard = Some(credential);
        true
    }

    /// Drop the cached credential only if it still carries `token`
    pub fn invalidate(&self, token: &str) -> bool {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(current) if current.token == token => {
                *guard = None;
                true
            }
            _ => false,
        }
    }
}
