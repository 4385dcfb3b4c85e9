//! In-memory session registry.
//!
//! Sessions live only in process memory. A revoked session is removed
//! outright, so a revoked id and an unknown id look the same to callers.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use folio_core::config::SessionConfig;

use crate::identity::Identity;

use super::model::{Session, SessionId};

/// Concurrent map of live sessions keyed by id.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<SessionId, Session>,
    idle_timeout: Option<Duration>,
    absolute_timeout: Option<Duration>,
}

impl SessionStore {
    /// Creates an empty store with the configured timeouts.
    pub fn new(config: &SessionConfig) -> Self {
        let minutes = config.idle_timeout_minutes as i64;
        let hours = config.absolute_timeout_hours as i64;
        Self {
            sessions: DashMap::new(),
            idle_timeout: (minutes > 0).then(|| Duration::minutes(minutes)),
            absolute_timeout: (hours > 0).then(|| Duration::hours(hours)),
        }
    }

    /// Registers a new active session for `identity`.
    pub fn create(&self, identity: &Identity, user_agent: Option<&str>, ip: &str) -> Session {
        let now = Utc::now();
        let session = Session {
            id: SessionId::generate(),
            identity_id: identity.id.clone(),
            user_agent: user_agent.map(str::to_string),
            ip: ip.to_string(),
            created_at: now,
            last_active: now,
            active: true,
            permissions: identity.permissions.clone(),
        };
        self.sessions.insert(session.id.clone(), session.clone());
        debug!(session_id = %session.id, identity_id = %session.identity_id, "Session created");
        session
    }

    /// Looks up a session. Sessions past their idle or absolute timeout are
    /// reported as absent even before the sweeper removes them.
    pub fn get(&self, id: &SessionId) -> Option<Session> {
        let session = self.sessions.get(id)?;
        if self.timed_out(&session, Utc::now()).is_some() {
            return None;
        }
        Some(session.clone())
    }

    /// Records activity on a session. Returns `false` if it does not exist.
    pub fn touch(&self, id: &SessionId) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut session) => {
                session.last_active = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Removes a session. Idempotent; returns whether anything was removed.
    pub fn revoke(&self, id: &SessionId) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            debug!(session_id = %id, "Session revoked");
        }
        removed
    }

    /// Removes every session owned by `identity_id`.
    pub fn revoke_all(&self, identity_id: &str) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.identity_id != identity_id);
        before.saturating_sub(self.sessions.len())
    }

    /// Live sessions of one identity, oldest first.
    pub fn list_for(&self, identity_id: &str) -> Vec<Session> {
        let now = Utc::now();
        let mut sessions: Vec<Session> = self
            .sessions
            .iter()
            .filter(|s| s.identity_id == identity_id && self.timed_out(s, now).is_none())
            .map(|s| s.value().clone())
            .collect();
        sessions.sort_by_key(|s| s.created_at);
        sessions
    }

    /// Drops sessions past their idle or absolute timeout as of `now`.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|id, session| match self.timed_out(session, now) {
            Some(reason) => {
                debug!(session_id = %id, reason, "Session timed out");
                false
            }
            None => true,
        });
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn timed_out(&self, session: &Session, now: DateTime<Utc>) -> Option<&'static str> {
        if let Some(absolute) = self.absolute_timeout {
            if now - session.created_at >= absolute {
                return Some("absolute timeout");
            }
        }
        if let Some(idle) = self.idle_timeout {
            if now - session.last_active >= idle {
                return Some("idle timeout");
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{PermissionSet, Role};

    fn identity(id: &str) -> Identity {
        Identity {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            role: Role::Admin,
            permissions: PermissionSet::admin(),
        }
    }

    fn store() -> SessionStore {
        SessionStore::new(&SessionConfig::default())
    }

    #[test]
    fn test_create_and_get() {
        let store = store();
        let session = store.create(&identity("admin"), Some("curl/8"), "127.0.0.1");
        let found = store.get(&session.id).unwrap();
        assert_eq!(found, session);
        assert!(found.active);
        assert_eq!(found.permissions, PermissionSet::admin());
        assert_eq!(found.user_agent.as_deref(), Some("curl/8"));
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let store = store();
        let session = store.create(&identity("admin"), None, "127.0.0.1");
        assert!(store.revoke(&session.id));
        assert!(!store.revoke(&session.id));
        assert!(store.get(&session.id).is_none());
        assert!(!store.revoke(&SessionId::from("unknown")));
    }

    #[test]
    fn test_revoke_all_only_touches_owner() {
        let store = store();
        store.create(&identity("admin"), None, "10.0.0.1");
        store.create(&identity("admin"), None, "10.0.0.2");
        let other = store.create(&identity("someone"), None, "10.0.0.3");

        assert_eq!(store.revoke_all("admin"), 2);
        assert_eq!(store.len(), 1);
        assert!(store.get(&other.id).is_some());
        assert!(store.list_for("admin").is_empty());
    }

    #[test]
    fn test_touch_updates_last_active() {
        let store = store();
        let session = store.create(&identity("admin"), None, "127.0.0.1");
        let backdated = session.last_active - Duration::minutes(5);
        store.sessions.get_mut(&session.id).unwrap().last_active = backdated;

        assert!(store.touch(&session.id));
        assert!(store.get(&session.id).unwrap().last_active > backdated);
        assert!(!store.touch(&SessionId::generate()));
    }

    #[test]
    fn test_idle_and_absolute_timeouts() {
        let store = SessionStore::new(&SessionConfig {
            idle_timeout_minutes: 30,
            absolute_timeout_hours: 2,
            sweep_interval_seconds: 60,
        });
        let idle = store.create(&identity("admin"), None, "127.0.0.1");
        let old = store.create(&identity("admin"), None, "127.0.0.1");
        let fresh = store.create(&identity("admin"), None, "127.0.0.1");

        store.sessions.get_mut(&idle.id).unwrap().last_active -= Duration::minutes(31);
        store.sessions.get_mut(&old.id).unwrap().created_at -= Duration::hours(3);

        assert!(store.get(&idle.id).is_none());
        assert!(store.get(&old.id).is_none());
        assert_eq!(store.list_for("admin").len(), 1);

        assert_eq!(store.purge_expired(Utc::now()), 2);
        assert_eq!(store.len(), 1);
        assert!(store.get(&fresh.id).is_some());
    }
}
