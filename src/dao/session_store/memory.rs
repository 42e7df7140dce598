use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;

use crate::dao::{session_store::SessionStore, storage::StorageResult};
use crate::session::{Session, SessionCode, session_key};

/// Volatile session store backed by a concurrent map.
///
/// Serves as the fallback backend when no durable engine is enabled and as
/// the store of choice in tests; contents vanish with the process.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<DashMap<String, Session>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn save_session(&self, session: Session) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .sessions
                .insert(session_key(&session.code), session);
            Ok(())
        })
    }

    fn find_session(&self, code: SessionCode) -> BoxFuture<'static, StorageResult<Option<Session>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .sessions
                .get(&session_key(&code))
                .map(|entry| entry.clone()))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
