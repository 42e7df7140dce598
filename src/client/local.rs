use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::info;

use crate::{
    client::{SessionError, SessionService, adapter::TieredStorage, identity::Identity},
    session::{MovieId, Session, SessionCode, User, session_key},
};

/// Session facade operating directly on tiered local storage.
///
/// Mirrors the server's canonical semantics: creator-seeded preferences,
/// idempotent joins, full-replacement preference updates. Only creation can
/// fail on storage (when every tier rejected its probe); later write
/// failures degrade persistence silently while the returned snapshots stay
/// correct for the current process.
#[derive(Clone)]
pub struct LocalSessionService {
    storage: Arc<TieredStorage>,
    identity: Identity,
}

impl LocalSessionService {
    /// Facade over the given storage adapter.
    pub fn new(storage: Arc<TieredStorage>) -> Self {
        let identity = Identity::new(storage.clone());
        Self { storage, identity }
    }

    /// The identity pointers sharing this facade's storage.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    fn load(&self, code: &SessionCode) -> Option<Session> {
        self.storage.get_json(&session_key(code))
    }

    fn store(&self, session: &Session) {
        self.storage.set_json(&session_key(&session.code), session);
    }
}

impl SessionService for LocalSessionService {
    fn create_session(&self, user: User) -> BoxFuture<'static, Result<Session, SessionError>> {
        let this = self.clone();
        Box::pin(async move {
            if !this.storage.available() {
                return Err(SessionError::StorageUnavailable);
            }

            let code = SessionCode::generate();
            let session = Session::new(code.clone(), user);
            this.store(&session);
            this.identity.set_current_session(&code);
            info!(code = %code, "session created locally");

            Ok(session)
        })
    }

    fn join_session(
        &self,
        code_input: String,
        user: User,
    ) -> BoxFuture<'static, Result<Session, SessionError>> {
        let this = self.clone();
        Box::pin(async move {
            let code = SessionCode::parse(&code_input)?;

            let Some(mut session) = this.load(&code) else {
                return Err(SessionError::NotFound { code });
            };

            if session.add_user(user) {
                this.store(&session);
            }
            this.identity.set_current_session(&code);

            Ok(session)
        })
    }

    fn get_session(
        &self,
        code_input: String,
    ) -> BoxFuture<'static, Result<Option<Session>, SessionError>> {
        let this = self.clone();
        Box::pin(async move {
            let code = SessionCode::parse(&code_input)?;
            Ok(this.load(&code))
        })
    }

    fn update_preferences(
        &self,
        code_input: String,
        user_id: String,
        movie_ids: Vec<MovieId>,
    ) -> BoxFuture<'static, Result<Option<Session>, SessionError>> {
        let this = self.clone();
        Box::pin(async move {
            let Ok(code) = SessionCode::parse(&code_input) else {
                return Ok(None);
            };
            let Some(mut session) = this.load(&code) else {
                return Ok(None);
            };

            session.set_preferences(&user_id, movie_ids);
            this.store(&session);

            Ok(Some(session))
        })
    }
}
