//! # Operator Sessions
//!
//! The session store behind an explicit interface with caller-controlled
//! lifecycle: construct one, hand it to whoever authenticates operators,
//! drop it on shutdown. Nothing here is a package-level singleton, so tests
//! run with their own instances and a networked store can slot in behind
//! the same trait.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use ricambi_core::types::OperatorProfile;
use ricambi_core::Operator;

/// An authenticated operator session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub operator_id: Uuid,
    pub username: String,
    pub profile: OperatorProfile,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Storage interface for operator sessions.
pub trait SessionStore: Send + Sync {
    /// Opens a session for an operator, returning the new session with its
    /// token.
    fn create(&self, operator: &Operator, ttl: Duration) -> Session;

    /// Looks up a live session by token. Expired sessions are treated as
    /// absent.
    fn get(&self, token: &str) -> Option<Session>;

    /// Closes a session. Returns whether a live session was removed.
    fn revoke(&self, token: &str) -> bool;

    /// Drops every expired session, returning how many were removed.
    fn purge_expired(&self) -> usize;
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        MemorySessionStore {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        // A poisoned lock means a panic mid-insert/remove on a plain
        // HashMap; the map itself is still consistent.
        match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self, operator: &Operator, ttl: Duration) -> Session {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            operator_id: operator.id,
            username: operator.username.clone(),
            profile: operator.profile,
            created_at: now,
            expires_at: now + ttl,
        };
        debug!(username = %session.username, "session opened");
        self.lock().insert(session.token.clone(), session.clone());
        session
    }

    fn get(&self, token: &str) -> Option<Session> {
        let mut sessions = self.lock();
        match sessions.get(token) {
            Some(session) if session.is_expired(Utc::now()) => {
                sessions.remove(token);
                None
            }
            Some(session) => Some(session.clone()),
            None => None,
        }
    }

    fn revoke(&self, token: &str) -> bool {
        let removed = self.lock().remove(token).is_some();
        if removed {
            debug!("session revoked");
        }
        removed
    }

    fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operator() -> Operator {
        Operator::new("mario", "Mario Bianchi", OperatorProfile::Clerk).unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let store = MemorySessionStore::new();
        let session = store.create(&operator(), Duration::hours(8));

        let found = store.get(&session.token).unwrap();
        assert_eq!(found.operator_id, session.operator_id);
        assert_eq!(found.profile, OperatorProfile::Clerk);
        assert!(store.get("no-such-token").is_none());
    }

    #[test]
    fn test_expired_session_is_absent() {
        let store = MemorySessionStore::new();
        let session = store.create(&operator(), Duration::seconds(-1));

        assert!(store.get(&session.token).is_none());
        // The lazy removal already dropped it.
        assert!(!store.revoke(&session.token));
    }

    #[test]
    fn test_revoke() {
        let store = MemorySessionStore::new();
        let session = store.create(&operator(), Duration::hours(8));

        assert!(store.revoke(&session.token));
        assert!(store.get(&session.token).is_none());
        assert!(!store.revoke(&session.token));
    }

    #[test]
    fn test_purge_expired() {
        let store = MemorySessionStore::new();
        store.create(&operator(), Duration::hours(8));
        store.create(&operator(), Duration::seconds(-1));
        store.create(&operator(), Duration::seconds(-1));

        assert_eq!(store.purge_expired(), 2);
        assert_eq!(store.purge_expired(), 0);
    }

    #[test]
    fn test_store_behind_trait_object() {
        let store: Box<dyn SessionStore> = Box::new(MemorySessionStore::new());
        let session = store.create(&operator(), Duration::hours(1));
        assert!(store.get(&session.token).is_some());
    }
}
