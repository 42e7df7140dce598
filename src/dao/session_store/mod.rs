pub mod memory;
#[cfg(feature = "sled-store")]
pub mod sled;

use futures::future::BoxFuture;

use crate::dao::storage::StorageResult;
use crate::session::{Session, SessionCode};

/// Abstraction over the persistence layer for session records.
pub trait SessionStore: Send + Sync {
    fn save_session(&self, session: Session) -> BoxFuture<'static, StorageResult<()>>;
    fn find_session(&self, code: SessionCode) -> BoxFuture<'static, StorageResult<Option<Session>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
