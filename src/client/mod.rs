//! Client-side session facades.
//!
//! Two interchangeable implementations of [`SessionService`] exist: a
//! local-first one operating on [`adapter::TieredStorage`] and a remote one
//! speaking the backend HTTP API. Callers pick one at deployment time; the
//! operations and their semantics are identical.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::session::{InvalidCodeError, MovieId, Session, SessionCode, User};

/// Tiered key-value storage with probe-once fallback selection.
pub mod adapter;
/// Current-user and current-session pointers.
pub mod identity;
/// Facade operating directly on local storage.
pub mod local;
/// Background polling of a live session into a watch channel.
pub mod poller;
/// Facade speaking the backend session API.
#[cfg(feature = "remote-client")]
pub mod remote;

pub use adapter::{Tier, TierCandidate, TieredStorage};
pub use identity::Identity;
pub use local::LocalSessionService;
pub use poller::{DEFAULT_POLL_INTERVAL, spawn_session_poller};
#[cfg(feature = "remote-client")]
pub use remote::RemoteSessionService;

/// Failures surfaced by the session facades.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Supplied input does not normalize into a session code.
    #[error("invalid session code `{input}`")]
    InvalidCode {
        /// Raw input as typed by the user.
        input: String,
    },
    /// Well-formed code with no matching session.
    #[error("session `{code}` not found")]
    NotFound {
        /// The normalized code that was looked up.
        code: SessionCode,
    },
    /// Every local persistence tier rejected its probe.
    #[error("session storage unavailable")]
    StorageUnavailable,
    /// The request never reached the server.
    #[error("cannot connect to server: {message}")]
    NetworkUnreachable {
        /// Transport-level failure description.
        message: String,
    },
    /// The server was reachable but rejected the operation.
    #[error("server rejected the request: {message}")]
    ServerRejected {
        /// Server-supplied error message.
        message: String,
    },
}

impl SessionError {
    /// Whether waiting and retrying the same call can reasonably succeed.
    ///
    /// Connectivity failures are worth retrying; validation and lookup
    /// failures are terminal until the caller changes its input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SessionError::NetworkUnreachable { .. })
    }
}

impl From<InvalidCodeError> for SessionError {
    fn from(err: InvalidCodeError) -> Self {
        SessionError::InvalidCode { input: err.input }
    }
}

/// The four session operations exposed to the UI layer.
///
/// Object safe so deployments can swap the local and remote variants behind
/// `Arc<dyn SessionService>` without touching call sites.
pub trait SessionService: Send + Sync {
    /// Create a session owned by `user` and make it the current session.
    fn create_session(&self, user: User) -> BoxFuture<'static, Result<Session, SessionError>>;

    /// Join the session identified by `code_input`, normalizing first.
    fn join_session(
        &self,
        code_input: String,
        user: User,
    ) -> BoxFuture<'static, Result<Session, SessionError>>;

    /// Fetch a session snapshot; `None` when no session exists for the code.
    fn get_session(
        &self,
        code_input: String,
    ) -> BoxFuture<'static, Result<Option<Session>, SessionError>>;

    /// Replace one member's liked-movie set with the supplied ids.
    ///
    /// Returns the updated snapshot, or `None` (not an error) when the
    /// session does not exist.
    fn update_preferences(
        &self,
        code_input: String,
        user_id: String,
        movie_ids: Vec<MovieId>,
    ) -> BoxFuture<'static, Result<Option<Session>, SessionError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_network_failures_are_retryable() {
        assert!(
            SessionError::NetworkUnreachable {
                message: "connection refused".into()
            }
            .is_retryable()
        );
        assert!(
            !SessionError::InvalidCode {
                input: "AB".into()
            }
            .is_retryable()
        );
        assert!(!SessionError::StorageUnavailable.is_retryable());
        assert!(
            !SessionError::ServerRejected {
                message: "nope".into()
            }
            .is_retryable()
        );
    }
}
