use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::StatusCode;

use crate::{
    client::{SessionError, SessionService, adapter::TieredStorage, identity::Identity},
    dto::session::{
        CreateSessionRequest, JoinSessionRequest, SessionEnvelope, UpdatePreferencesRequest,
    },
    session::{MovieId, Session, SessionCode, User},
};

/// Session facade backed by the HTTP session API.
///
/// Codes are generated client side and validated before any request goes
/// out. Transport failures (the request never reached the server) surface
/// as the retryable [`SessionError::NetworkUnreachable`]; a reachable server
/// answering with a false success flag surfaces its own message as
/// [`SessionError::ServerRejected`].
#[derive(Clone)]
pub struct RemoteSessionService {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    identity: Identity,
}

impl RemoteSessionService {
    /// Facade targeting `base_url` with the given bearer credential.
    ///
    /// Identity pointers live in the supplied local storage adapter so the
    /// current user and session survive restarts even in remote deployments.
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        storage: Arc<TieredStorage>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_token: api_token.into(),
            identity: Identity::new(storage),
        }
    }

    /// The identity pointers backing this facade.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn exchange(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, SessionEnvelope), SessionError> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|err| SessionError::NetworkUnreachable {
                message: err.to_string(),
            })?;

        let status = response.status();
        let envelope =
            response
                .json::<SessionEnvelope>()
                .await
                .map_err(|err| SessionError::ServerRejected {
                    message: format!("malformed server response: {err}"),
                })?;

        Ok((status, envelope))
    }
}

fn accepted(status: StatusCode, envelope: SessionEnvelope) -> Result<Session, SessionError> {
    match (envelope.success, envelope.session) {
        (true, Some(session)) => Ok(session),
        _ => Err(SessionError::ServerRejected {
            message: envelope
                .error
                .unwrap_or_else(|| format!("server returned status {status}")),
        }),
    }
}

impl SessionService for RemoteSessionService {
    fn create_session(&self, user: User) -> BoxFuture<'static, Result<Session, SessionError>> {
        let this = self.clone();
        Box::pin(async move {
            let code = SessionCode::generate();
            let body = CreateSessionRequest {
                code: code.to_string(),
                user: user.into(),
            };

            let request = this.http.post(this.url("/sessions/create")).json(&body);
            let (status, envelope) = this.exchange(request).await?;

            let session = accepted(status, envelope)?;
            this.identity.set_current_session(&session.code);
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
            let body = JoinSessionRequest {
                code: code.to_string(),
                user: user.into(),
            };

            let request = this.http.post(this.url("/sessions/join")).json(&body);
            let (status, envelope) = this.exchange(request).await?;

            if status == StatusCode::NOT_FOUND {
                return Err(SessionError::NotFound { code });
            }

            let session = accepted(status, envelope)?;
            this.identity.set_current_session(&session.code);
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

            let request = this.http.get(this.url(&format!("/sessions/{code}")));
            let (status, envelope) = this.exchange(request).await?;

            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }

            accepted(status, envelope).map(Some)
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
            let body = UpdatePreferencesRequest { user_id, movie_ids };

            let request = this
                .http
                .post(this.url(&format!("/sessions/{code}/preferences")))
                .json(&body);
            let (status, envelope) = this.exchange(request).await?;

            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }

            accepted(status, envelope).map(Some)
        })
    }
}
