use std::sync::Arc;

use crate::{
    client::adapter::TieredStorage,
    session::{SessionCode, User},
};

/// Storage key holding the logged-in user record.
pub const CURRENT_USER_KEY: &str = "cinematch_current_user";
/// Storage key holding the code of the session being viewed.
pub const CURRENT_SESSION_KEY: &str = "cinematch_current_session";

/// Process-local pointers restoring who is logged in and which session they
/// were viewing across restarts.
///
/// Pointers only: clearing them never touches session records.
#[derive(Clone)]
pub struct Identity {
    storage: Arc<TieredStorage>,
}

impl Identity {
    /// Pointers backed by the given storage adapter.
    pub fn new(storage: Arc<TieredStorage>) -> Self {
        Self { storage }
    }

    /// The logged-in user, absent when unset or unreadable.
    pub fn current_user(&self) -> Option<User> {
        self.storage.get_json(CURRENT_USER_KEY)
    }

    /// Record `user` as logged in.
    pub fn set_current_user(&self, user: &User) {
        self.storage.set_json(CURRENT_USER_KEY, user);
    }

    /// The active session code, absent when unset or no longer a valid code.
    pub fn current_session_code(&self) -> Option<SessionCode> {
        self.storage.get_json(CURRENT_SESSION_KEY)
    }

    /// Record `code` as the active session.
    pub fn set_current_session(&self, code: &SessionCode) {
        self.storage.set_json(CURRENT_SESSION_KEY, code);
    }

    /// Forget the active session without touching the stored record.
    pub fn clear_current_session(&self) {
        self.storage.remove(CURRENT_SESSION_KEY);
    }

    /// Clear both pointers; session records stay untouched.
    pub fn logout(&self) {
        self.storage.remove(CURRENT_USER_KEY);
        self.storage.remove(CURRENT_SESSION_KEY);
    }
}
