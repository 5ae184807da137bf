use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::models::VerifiedUser;

/// The signed-in user, built from an accepted verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub id: String,
    pub name: String,
    pub username: String,
    pub token: String,
}

impl UserSession {
    pub fn from_verified(user: VerifiedUser, token: &str) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            token: token.to_string(),
        }
    }
}

/// Shared handle to the current session.
///
/// Clones observe the same value. Readers call [`get`](Self::get) or hold a
/// receiver from [`subscribe`](Self::subscribe); writers are the resolver and
/// the sign-out path.
#[derive(Clone)]
pub struct SessionStore {
    tx: watch::Sender<Option<UserSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn get(&self) -> Option<UserSession> {
        self.tx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserSession>> {
        self.tx.subscribe()
    }

    /// Publish `session`. Subscribers are only notified when the value changes.
    pub fn set(&self, session: UserSession) {
        self.tx.send_if_modified(|current| {
            if current.as_ref() == Some(&session) {
                false
            } else {
                *current = Some(session);
                true
            }
        });
    }

    pub fn clear(&self) {
        self.tx.send_if_modified(|current| current.take().is_some());
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(name: &str) -> UserSession {
        UserSession {
            id: "1".to_string(),
            name: name.to_string(),
            username: "ada".to_string(),
            token: "tok".to_string(),
        }
    }

    #[test]
    fn test_store_starts_empty() {
        let store = SessionStore::new();
        assert_eq!(store.get(), None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_clones_share_value() {
        let store = SessionStore::new();
        let reader = store.clone();
        store.set(session("Ada"));
        assert_eq!(reader.get(), Some(session("Ada")));
        store.clear();
        assert_eq!(reader.get(), None);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes_only() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();

        store.set(session("Ada"));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        // Same value again does not notify
        store.set(session("Ada"));
        assert!(!rx.has_changed().unwrap());

        store.set(session("Ada L."));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().map(|s| s.name.as_str()), Some("Ada L."));

        store.clear();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_none());

        // Clearing an empty store does not notify
        store.clear();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_from_verified() {
        let user = VerifiedUser {
            id: "9".to_string(),
            name: "Grace".to_string(),
            username: "grace".to_string(),
        };
        let s = UserSession::from_verified(user, "tok-9");
        assert_eq!(s.id, "9");
        assert_eq!(s.token, "tok-9");
    }
}
