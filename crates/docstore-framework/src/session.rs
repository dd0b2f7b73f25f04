//! # Session Provider
//!
//! The client only ever *reads* the session: "who is signed in right now, if anyone".
//! Signing in and out belongs to the host application, which owns a [`SessionState`].

use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Read access to the current authenticated user.
pub trait SessionProvider: Send + Sync {
    /// The signed-in user's id, or `None` when nobody is signed in.
    fn current_user_id(&self) -> Option<String>;
}

/// Process-local session backed by a `watch` channel.
///
/// Clones share the same state, so the application can keep one handle for signing in and
/// out while the client holds another.
#[derive(Debug, Clone)]
pub struct SessionState {
    current: Arc<watch::Sender<Option<String>>>,
}

impl SessionState {
    /// A session with nobody signed in.
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current: Arc::new(current),
        }
    }

    /// A session already signed in as `user_id`.
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        let session = Self::new();
        session.sign_in(user_id);
        session
    }

    pub fn sign_in(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        info!(%user_id, "Signed in");
        self.current.send_replace(Some(user_id));
    }

    pub fn sign_out(&self) {
        if let Some(user_id) = self.current.send_replace(None) {
            info!(%user_id, "Signed out");
        }
    }

    /// Watch sign-in changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.current.subscribe()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for SessionState {
    fn current_user_id(&self) -> Option<String> {
        self.current.borrow().clone()
    }
}

/// Fixed session, handy for tools and tests that never change users.
impl SessionProvider for Option<String> {
    fn current_user_id(&self) -> Option<String> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_and_out() {
        let session = SessionState::new();
        assert_eq!(session.current_user_id(), None);

        session.sign_in("user_1");
        assert_eq!(session.current_user_id().as_deref(), Some("user_1"));

        let shared = session.clone();
        shared.sign_out();
        assert_eq!(session.current_user_id(), None);
    }
}
