use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::validation::validate_session_code,
    session::{MovieId, Session, User},
};

/// Member identity supplied by clients on create and join calls.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct UserInput {
    #[validate(length(min = 1, message = "user id must not be empty"))]
    pub id: String,
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    /// Preferred genres captured during onboarding.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Free-form mood descriptor captured during onboarding.
    #[serde(default)]
    pub vibe: String,
}

impl From<UserInput> for User {
    fn from(input: UserInput) -> Self {
        User {
            id: input.id,
            username: input.username,
            genres: input.genres,
            vibe: input.vibe,
        }
    }
}

impl From<User> for UserInput {
    fn from(user: User) -> Self {
        UserInput {
            id: user.id,
            username: user.username,
            genres: user.genres,
            vibe: user.vibe,
        }
    }
}

/// Payload used to register a freshly generated session.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    /// Client-generated session code; normalized before storage.
    pub code: String,
    pub user: UserInput,
}

impl Validate for CreateSessionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_session_code(&self.code) {
            errors.add("code", e);
        }

        if let Err(user_errors) = self.user.validate() {
            errors.merge_self("user", Err(user_errors));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Payload used to join an existing session by code.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JoinSessionRequest {
    pub code: String,
    pub user: UserInput,
}

impl Validate for JoinSessionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_session_code(&self.code) {
            errors.add("code", e);
        }

        if let Err(user_errors) = self.user.validate() {
            errors.merge_self("user", Err(user_errors));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Full-replacement update of one member's liked movies.
///
/// Callers always send the complete accumulated set, never a delta.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    #[validate(length(min = 1, message = "user id must not be empty"))]
    pub user_id: String,
    pub movie_ids: Vec<MovieId>,
}

/// Envelope wrapping every session endpoint response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionEnvelope {
    /// Successful envelope carrying the session snapshot.
    pub fn ok(session: Session) -> Self {
        Self {
            success: true,
            session: Some(session),
            error: None,
        }
    }
}
