use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock, watch};

use crate::{dao::session_store::SessionStore, error::ServiceError, session::SessionCode};

/// Cheaply cloneable handle to the shared application state.
pub type SharedState = Arc<AppState>;

/// Central application state holding the storage slot, the degraded flag,
/// and the per-code write locks.
pub struct AppState {
    session_store: RwLock<Option<Arc<dyn SessionStore>>>,
    degraded: watch::Sender<bool>,
    code_locks: DashMap<String, Arc<Mutex<()>>>,
    api_token: String,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(api_token: impl Into<String>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            session_store: RwLock::new(None),
            degraded: degraded_tx,
            code_locks: DashMap::new(),
            api_token: api_token.into(),
        })
    }

    /// Obtain a handle to the current session store, if one is installed.
    pub async fn session_store(&self) -> Option<Arc<dyn SessionStore>> {
        let guard = self.session_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the session store or fail with the degraded-mode error.
    pub async fn require_session_store(&self) -> Result<Arc<dyn SessionStore>, ServiceError> {
        self.session_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn set_session_store(&self, store: Arc<dyn SessionStore>) {
        {
            let mut guard = self.session_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current storage backend and enter degraded mode.
    pub async fn clear_session_store(&self) {
        {
            let mut guard = self.session_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update the degraded flag, notifying watchers only on a change.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }

    /// Bearer credential expected on the session endpoints.
    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Mutex serializing load-mutate-save cycles for one session code.
    ///
    /// Locks are created on demand and kept for the process lifetime; the
    /// small set of live codes keeps the registry bounded in practice.
    pub fn code_lock(&self, code: &SessionCode) -> Arc<Mutex<()>> {
        self.code_locks
            .entry(code.as_str().to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::session_store::memory::MemorySessionStore;

    #[tokio::test]
    async fn test_starts_degraded_until_store_installed() {
        let state = AppState::new("token");
        assert!(state.is_degraded());
        assert!(state.require_session_store().await.is_err());

        state
            .set_session_store(Arc::new(MemorySessionStore::new()))
            .await;
        assert!(!state.is_degraded());
        assert!(state.require_session_store().await.is_ok());
    }

    #[tokio::test]
    async fn test_degraded_watcher_sees_transitions() {
        let state = AppState::new("token");
        let mut watcher = state.degraded_watcher();
        assert!(*watcher.borrow_and_update());

        state
            .set_session_store(Arc::new(MemorySessionStore::new()))
            .await;
        watcher.changed().await.unwrap();
        assert!(!*watcher.borrow_and_update());

        state.clear_session_store().await;
        watcher.changed().await.unwrap();
        assert!(*watcher.borrow_and_update());
    }

    #[tokio::test]
    async fn test_code_lock_is_shared_per_code() {
        let state = AppState::new("token");
        let code = SessionCode::parse("AB12CD").unwrap();

        let first = state.code_lock(&code);
        let second = state.code_lock(&code);
        assert!(Arc::ptr_eq(&first, &second));

        let other = state.code_lock(&SessionCode::parse("ZZ99ZZ").unwrap());
        assert!(!Arc::ptr_eq(&first, &other));
    }
}
