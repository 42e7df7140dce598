use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, header::AUTHORIZATION},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::session::{
        CreateSessionRequest, JoinSessionRequest, SessionEnvelope, UpdatePreferencesRequest,
    },
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Bearer-protected endpoints for session lifecycle and preference tracking.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/sessions/create", post(create_session))
        .route("/sessions/join", post(join_session))
        .route("/sessions/{code}", get(get_session))
        .route("/sessions/{code}/preferences", post(update_preferences))
        .route_layer(middleware::from_fn_with_state(state, require_bearer_token))
}

/// Register a session under a client-generated code.
#[utoipa::path(
    post,
    path = "/sessions/create",
    tag = "sessions",
    params(("Authorization" = String, Header, description = "Bearer credential for the session API")),
    request_body = CreateSessionRequest,
    responses((status = 200, description = "Session created", body = SessionEnvelope))
)]
pub async fn create_session(
    State(state): State<SharedState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Json<SessionEnvelope>, AppError> {
    payload.validate()?;
    let session = session_service::create_session(&state, payload).await?;
    Ok(Json(SessionEnvelope::ok(session)))
}

/// Join an existing session by code.
#[utoipa::path(
    post,
    path = "/sessions/join",
    tag = "sessions",
    params(("Authorization" = String, Header, description = "Bearer credential for the session API")),
    request_body = JoinSessionRequest,
    responses((status = 200, description = "Session joined", body = SessionEnvelope))
)]
pub async fn join_session(
    State(state): State<SharedState>,
    Json(payload): Json<JoinSessionRequest>,
) -> Result<Json<SessionEnvelope>, AppError> {
    payload.validate()?;
    let session = session_service::join_session(&state, payload).await?;
    Ok(Json(SessionEnvelope::ok(session)))
}

/// Fetch the current snapshot of a session.
#[utoipa::path(
    get,
    path = "/sessions/{code}",
    tag = "sessions",
    params(("Authorization" = String, Header, description = "Bearer credential for the session API"),
    ("code" = String, Path, description = "Session code, normalized server side")),
    responses((status = 200, description = "Session snapshot", body = SessionEnvelope))
)]
pub async fn get_session(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<SessionEnvelope>, AppError> {
    let session = session_service::get_session(&state, &code).await?;
    Ok(Json(SessionEnvelope::ok(session)))
}

#[utoipa::path(
    post,
    path = "/sessions/{code}/preferences",
    tag = "sessions",
    params(("Authorization" = String, Header, description = "Bearer credential for the session API"),
    ("code" = String, Path, description = "Session code, normalized server side")),
    request_body = UpdatePreferencesRequest,
    responses((status = 200, description = "Preferences replaced", body = SessionEnvelope))
)]
pub async fn update_preferences(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<UpdatePreferencesRequest>,
) -> Result<Json<SessionEnvelope>, AppError> {
    payload.validate()?;
    let session = session_service::update_preferences(&state, &code, payload).await?;
    Ok(Json(SessionEnvelope::ok(session)))
}

async fn require_bearer_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|value| value.to_owned())
        .ok_or_else(|| AppError::Unauthorized("missing bearer credential".into()))?;

    if provided == state.api_token() {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized("invalid bearer credential".into()))
    }
}
