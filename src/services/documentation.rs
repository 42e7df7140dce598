use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the CineMatch session backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sessions::create_session,
        crate::routes::sessions::join_session,
        crate::routes::sessions::get_session,
        crate::routes::sessions::update_preferences,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::session::CreateSessionRequest,
            crate::dto::session::JoinSessionRequest,
            crate::dto::session::UpdatePreferencesRequest,
            crate::dto::session::UserInput,
            crate::dto::session::SessionEnvelope,
            crate::session::Session,
            crate::session::User,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sessions", description = "Session lifecycle and preference tracking"),
    )
)]
pub struct ApiDoc;
