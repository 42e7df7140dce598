use std::path::Path;

use futures::future::BoxFuture;
use sled::Db;

use crate::dao::{
    session_store::SessionStore,
    storage::{StorageError, StorageResult},
};
use crate::session::{Session, SessionCode, session_key};

/// Durable session store backed by an embedded sled tree.
///
/// Records live under their `session:{CODE}` key as JSON, mirroring the wire
/// shape, and every write is flushed so sessions survive an abrupt stop.
#[derive(Clone)]
pub struct SledSessionStore {
    db: Db,
}

impl SledSessionStore {
    /// Open or create the sled database at `path`.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|source| {
            StorageError::unavailable(
                format!("failed to open sled database at `{}`", path.display()),
                source,
            )
        })?;
        Ok(Self { db })
    }
}

impl SessionStore for SledSessionStore {
    fn save_session(&self, session: Session) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let key = session_key(&session.code);
            let bytes = serde_json::to_vec(&session).map_err(|source| {
                StorageError::unavailable(
                    format!("failed to encode session `{}`", session.code),
                    source,
                )
            })?;
            store
                .db
                .insert(key.as_bytes(), bytes)
                .map_err(|source| {
                    StorageError::unavailable(format!("failed to write `{key}`"), source)
                })?;
            store.db.flush_async().await.map_err(|source| {
                StorageError::unavailable(format!("failed to flush `{key}`"), source)
            })?;
            Ok(())
        })
    }

    fn find_session(&self, code: SessionCode) -> BoxFuture<'static, StorageResult<Option<Session>>> {
        let store = self.clone();
        Box::pin(async move {
            let key = session_key(&code);
            let Some(bytes) = store.db.get(key.as_bytes()).map_err(|source| {
                StorageError::unavailable(format!("failed to read `{key}`"), source)
            })?
            else {
                return Ok(None);
            };

            let session =
                serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupted {
                    key,
                    source,
                })?;
            Ok(Some(session))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .db
                .flush_async()
                .await
                .map(|_| ())
                .map_err(|source| StorageError::unavailable("sled flush failed".into(), source))
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        // Embedded engine: nothing to re-establish beyond proving a flush works.
        self.health_check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::User;
    use uuid::Uuid;

    fn temp_store() -> SledSessionStore {
        let path = std::env::temp_dir().join(format!("cinematch-sled-{}", Uuid::new_v4()));
        SledSessionStore::open(path).expect("open sled store")
    }

    #[tokio::test]
    async fn test_save_and_find_round_trip() {
        let store = temp_store();
        let code = SessionCode::parse("SLED42").unwrap();
        let session = Session::new(code.clone(), User::new("Ana"));

        store.save_session(session.clone()).await.unwrap();
        let found = store.find_session(code).await.unwrap();
        assert_eq!(found, Some(session));
    }

    #[tokio::test]
    async fn test_find_missing_session_is_none() {
        let store = temp_store();
        let code = SessionCode::parse("NOSUCH").unwrap();
        assert_eq!(store.find_session(code).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_garbage_record_surfaces_corruption() {
        let store = temp_store();
        let code = SessionCode::parse("BADREC").unwrap();
        store
            .db
            .insert(session_key(&code).as_bytes(), &b"not json"[..])
            .unwrap();

        let err = store.find_session(code).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupted { .. }));
    }
}
