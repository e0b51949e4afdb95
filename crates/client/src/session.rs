//! Caller-owned session state
//!
//! The token pair returned by OTP verification belongs to the caller, not to
//! the client: a client reads the tokens at construction and never writes to
//! any store. Persistence happens through explicit [`SessionStore`] load/save
//! hooks invoked by the surrounding application.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Access/refresh token pair for an authenticated session
///
/// The access token is short-lived and opaque; the refresh token is
/// longer-lived and exchanged for fresh access tokens. Token shape is not
/// validated locally: a malformed token simply fails at the server as an
/// authorization error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

impl Session {
    /// Create a session from a token pair
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Errors raised by session stores
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Explicit load/save hooks for wherever a session is kept
///
/// Implementations own the storage location; callers decide when to load a
/// session into a client and when to save it back (e.g. after a request that
/// may have rotated the access token).
pub trait SessionStore {
    /// Load the stored session, if any
    fn load(&self) -> Result<Option<Session>, SessionStoreError>;

    /// Persist the session
    fn save(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// Forget the stored session
    fn clear(&self) -> Result<(), SessionStoreError>;
}

/// In-memory session store for tests and short-lived tools
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.inner.lock().expect("session store lock poisoned").clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        *self.inner.lock().expect("session store lock poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        *self.inner.lock().expect("session store lock poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_uses_camel_case_wire_names() {
        let session = Session::new("A1", "R1");
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["accessToken"], "A1");
        assert_eq!(json["refreshToken"], "R1");
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemorySessionStore::new();
        assert!(store.load().unwrap().is_none());

        let session = Session::new("A1", "R1");
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
