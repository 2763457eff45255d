//! 会话模块
//!
//! Holds the signed-in session, mirrors it into durable storage and
//! tells the UI whenever the authentication state changes.

use crate::error::{AdminError, AdminResult};
use aqargo_shared::Session;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{info, warn};

// =========================================================
// 持久化抽象 (Durable Storage)
// =========================================================

/// Synchronous key/value storage (`localStorage` in the browser).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> AdminResult<()>;
    fn remove(&self, key: &str);
}

/// In-memory store. Clones share the same map, which is how tests simulate a
/// page reload: build a fresh gate over the same store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> AdminResult<()> {
        self.inner
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.inner.borrow_mut().remove(key);
    }
}

// =========================================================
// 认证状态机 (Auth State Machine)
// =========================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated(Session),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

type Listener = Rc<dyn Fn(&AuthState)>;

struct GateInner {
    state: RefCell<AuthState>,
    store: Box<dyn KeyValueStore>,
    key: String,
    listener: RefCell<Option<Listener>>,
}

/// Session gate shared by the API client and the UI.
///
/// Cheap to clone; every clone sees the same state.
#[derive(Clone)]
pub struct SessionGate {
    inner: Rc<GateInner>,
}

impl SessionGate {
    pub fn new(store: impl KeyValueStore + 'static, key: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(GateInner {
                state: RefCell::new(AuthState::Anonymous),
                store: Box::new(store),
                key: key.into(),
                listener: RefCell::new(None),
            }),
        }
    }

    /// Register the single observer (the UI's auth signal).
    pub fn on_change(&self, listener: impl Fn(&AuthState) + 'static) {
        *self.inner.listener.borrow_mut() = Some(Rc::new(listener));
    }

    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn session(&self) -> Option<Session> {
        match &*self.inner.state.borrow() {
            AuthState::Authenticated(s) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<String> {
        match &*self.inner.state.borrow() {
            AuthState::Authenticated(s) => Some(s.token.clone()),
            _ => None,
        }
    }

    fn transition(&self, next: AuthState) {
        *self.inner.state.borrow_mut() = next;
        // Clone out so the listener may read the gate again.
        let listener = self.inner.listener.borrow().clone();
        if let Some(listener) = listener {
            let state = self.state();
            listener(&state);
        }
    }

    /// Reload the persisted session. Corrupt or token-less entries are
    /// discarded.
    pub fn restore(&self) -> Option<Session> {
        let raw = self.inner.store.get(&self.inner.key)?;
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if !session.token.trim().is_empty() => {
                info!(user = %session.display_name(), "session restored");
                self.transition(AuthState::Authenticated(session.clone()));
                Some(session)
            }
            Ok(_) | Err(_) => {
                warn!(key = %self.inner.key, "discarding unreadable persisted session");
                self.inner.store.remove(&self.inner.key);
                None
            }
        }
    }

    /// Enter `Authenticating`. Fails if a login is already in flight.
    pub fn begin_login(&self) -> AdminResult<()> {
        if *self.inner.state.borrow() == AuthState::Authenticating {
            return Err(AdminError::server(409, "a sign-in is already in progress"));
        }
        self.transition(AuthState::Authenticating);
        Ok(())
    }

    /// Settle a login attempt started with [`begin_login`](Self::begin_login).
    pub fn complete_login(&self, result: AdminResult<Session>) -> AdminResult<Session> {
        match result {
            Ok(session) => {
                let raw = serde_json::to_string(&session)?;
                if let Err(e) = self.inner.store.set(&self.inner.key, &raw) {
                    // Still signed in for this tab; only persistence failed.
                    warn!(error = %e, "failed to persist session");
                }
                info!(user = %session.display_name(), "signed in");
                self.transition(AuthState::Authenticated(session.clone()));
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "sign-in failed");
                // A replaced session must not come back on the next restore.
                self.inner.store.remove(&self.inner.key);
                self.transition(AuthState::Anonymous);
                Err(e)
            }
        }
    }

    /// Clear memory and storage.
    pub fn logout(&self) {
        self.inner.store.remove(&self.inner.key);
        if *self.inner.state.borrow() != AuthState::Anonymous {
            info!("signed out");
            self.transition(AuthState::Anonymous);
        }
    }

    /// Called on any 401: same as logout, logged differently.
    pub fn expire(&self) {
        if self.is_authenticated() {
            warn!("session rejected by server, signing out");
        }
        self.inner.store.remove(&self.inner.key);
        if *self.inner.state.borrow() != AuthState::Anonymous {
            self.transition(AuthState::Anonymous);
        }
    }
}

pub const GENERIC_LOGIN_FAILURE: &str = "Invalid email or password";

/// Message shown under the login form: the server's email message, then its
/// password message, otherwise a generic line.
pub fn login_failure_message(err: &AdminError) -> String {
    match err {
        AdminError::Validation(fields) => fields
            .get("email")
            .or_else(|| fields.get("password"))
            .unwrap_or(GENERIC_LOGIN_FAILURE)
            .to_string(),
        AdminError::Network(_) => err.to_string(),
        _ => GENERIC_LOGIN_FAILURE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqargo_shared::FieldErrors;
    use serde_json::json;
    use std::cell::Cell;

    fn session() -> Session {
        Session {
            token: "tok-1".into(),
            user: json!({ "email": "admin@aqargo.sa" }),
        }
    }

    #[test]
    fn restore_after_reload_and_none_after_logout() {
        let store = MemoryStore::new();
        let gate = SessionGate::new(store.clone(), "auth");
        gate.begin_login().unwrap();
        gate.complete_login(Ok(session())).unwrap();
        assert!(store.get("auth").is_some());

        // "reload": new gate over the same storage
        let reloaded = SessionGate::new(store.clone(), "auth");
        assert_eq!(reloaded.restore(), Some(session()));
        assert_eq!(reloaded.token().as_deref(), Some("tok-1"));

        reloaded.logout();
        assert!(store.get("auth").is_none());
        let again = SessionGate::new(store, "auth");
        assert_eq!(again.restore(), None);
        assert_eq!(again.state(), AuthState::Anonymous);
    }

    #[test]
    fn corrupt_storage_is_discarded() {
        let store = MemoryStore::new();
        store.set("auth", "{not json").unwrap();
        let gate = SessionGate::new(store.clone(), "auth");
        assert!(gate.restore().is_none());
        assert!(store.get("auth").is_none());

        store.set("auth", r#"{"token":"","user":{}}"#).unwrap();
        assert!(gate.restore().is_none());
    }

    #[test]
    fn failed_login_returns_to_anonymous() {
        let gate = SessionGate::new(MemoryStore::new(), "auth");
        gate.begin_login().unwrap();
        assert_eq!(gate.state(), AuthState::Authenticating);
        assert!(gate.begin_login().is_err());
        let err = gate.complete_login(Err(AdminError::Unauthorized)).unwrap_err();
        assert_eq!(err, AdminError::Unauthorized);
        assert_eq!(gate.state(), AuthState::Anonymous);
    }

    #[test]
    fn failed_relogin_forgets_the_previous_session() {
        let store = MemoryStore::new();
        let gate = SessionGate::new(store.clone(), "auth");
        gate.begin_login().unwrap();
        gate.complete_login(Ok(session())).unwrap();
        assert!(store.get("auth").is_some());

        gate.begin_login().unwrap();
        assert!(gate.complete_login(Err(AdminError::Unauthorized)).is_err());
        assert_eq!(gate.state(), AuthState::Anonymous);
        assert!(store.get("auth").is_none());

        let reloaded = SessionGate::new(store, "auth");
        assert_eq!(reloaded.restore(), None);
    }

    #[test]
    fn listener_sees_expiry() {
        let gate = SessionGate::new(MemoryStore::new(), "auth");
        let changes = Rc::new(Cell::new(0));
        let seen = changes.clone();
        gate.on_change(move |_| seen.set(seen.get() + 1));

        gate.begin_login().unwrap();
        gate.complete_login(Ok(session())).unwrap();
        gate.expire();
        assert!(!gate.is_authenticated());
        assert_eq!(changes.get(), 3);

        // already anonymous: no extra notification
        gate.expire();
        assert_eq!(changes.get(), 3);
    }

    #[test]
    fn login_message_prefers_email_then_password() {
        let both: FieldErrors = [("password", "too short"), ("email", "unknown email")]
            .into_iter()
            .collect();
        assert_eq!(login_failure_message(&AdminError::Validation(both)), "unknown email");

        let pw: FieldErrors = [("password", "wrong password")].into_iter().collect();
        assert_eq!(login_failure_message(&AdminError::Validation(pw)), "wrong password");

        assert_eq!(
            login_failure_message(&AdminError::Unauthorized),
            GENERIC_LOGIN_FAILURE
        );
    }
}
