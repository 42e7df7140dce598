use tracing::info;

use crate::{
    dto::session::{CreateSessionRequest, JoinSessionRequest, UpdatePreferencesRequest},
    error::ServiceError,
    session::{Session, SessionCode, User},
    state::SharedState,
};

/// Register a session under its client-generated code.
///
/// The code is re-normalized server side; an existing record under the same
/// code is overwritten (collisions over the code keyspace are accepted as
/// negligible rather than detected).
pub async fn create_session(
    state: &SharedState,
    request: CreateSessionRequest,
) -> Result<Session, ServiceError> {
    let code = SessionCode::parse(&request.code)?;
    let store = state.require_session_store().await?;

    let lock = state.code_lock(&code);
    let _guard = lock.lock().await;

    let session = Session::new(code.clone(), request.user.into());
    store.save_session(session.clone()).await?;
    info!(code = %code, "session created");

    Ok(session)
}

/// Add a user to an existing session, keyed by its normalized code.
///
/// Joining a session the user already belongs to is a no-op that returns the
/// current snapshot without rewriting the record.
pub async fn join_session(
    state: &SharedState,
    request: JoinSessionRequest,
) -> Result<Session, ServiceError> {
    let code = SessionCode::parse(&request.code)?;
    let store = state.require_session_store().await?;

    let lock = state.code_lock(&code);
    let _guard = lock.lock().await;

    let Some(mut session) = store.find_session(code.clone()).await? else {
        return Err(ServiceError::NotFound(format!(
            "session `{code}` not found"
        )));
    };

    let user: User = request.user.into();
    let username = user.username.clone();
    if session.add_user(user) {
        store.save_session(session.clone()).await?;
        info!(code = %code, username = %username, "user joined session");
    }

    Ok(session)
}

/// Look up a session by a raw code input.
///
/// Pure read: no lock is taken and nothing is written.
pub async fn get_session(
    state: &SharedState,
    code_input: &str,
) -> Result<Session, ServiceError> {
    let code = SessionCode::parse(code_input)?;
    let store = state.require_session_store().await?;

    let Some(session) = store.find_session(code.clone()).await? else {
        return Err(ServiceError::NotFound(format!(
            "session `{code}` not found"
        )));
    };

    Ok(session)
}

/// Replace one member's liked-movie set with the supplied ids.
pub async fn update_preferences(
    state: &SharedState,
    code_input: &str,
    request: UpdatePreferencesRequest,
) -> Result<Session, ServiceError> {
    let code = SessionCode::parse(code_input)?;
    let store = state.require_session_store().await?;

    let lock = state.code_lock(&code);
    let _guard = lock.lock().await;

    let Some(mut session) = store.find_session(code.clone()).await? else {
        return Err(ServiceError::NotFound(format!(
            "session `{code}` not found"
        )));
    };

    session.set_preferences(&request.user_id, request.movie_ids);
    store.save_session(session.clone()).await?;

    Ok(session)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::session_store::memory::MemorySessionStore,
        dto::session::UserInput,
        state::AppState,
    };

    fn user_input(id: &str, username: &str) -> UserInput {
        UserInput {
            id: id.to_string(),
            username: username.to_string(),
            genres: Vec::new(),
            vibe: String::new(),
        }
    }

    async fn state_with_store() -> SharedState {
        let state = AppState::new("token");
        state
            .set_session_store(Arc::new(MemorySessionStore::new()))
            .await;
        state
    }

    #[tokio::test]
    async fn test_create_session_roundtrip() {
        let state = state_with_store().await;

        let created = create_session(
            &state,
            CreateSessionRequest {
                code: " ab-12cd ".into(),
                user: user_input("u1", "Ada"),
            },
        )
        .await
        .unwrap();
        assert_eq!(created.code.as_str(), "AB12CD");
        assert_eq!(created.users.len(), 1);
        assert_eq!(created.preferences.get("u1").map(Vec::len), Some(0));

        let fetched = get_session(&state, "ab12cd").await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_session_requires_store() {
        let state = AppState::new("token");

        let err = create_session(
            &state,
            CreateSessionRequest {
                code: "AB12CD".into(),
                user: user_input("u1", "Ada"),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
    }

    #[tokio::test]
    async fn test_join_session_appends_once() {
        let state = state_with_store().await;
        create_session(
            &state,
            CreateSessionRequest {
                code: "AB12CD".into(),
                user: user_input("u1", "Ada"),
            },
        )
        .await
        .unwrap();

        let joined = join_session(
            &state,
            JoinSessionRequest {
                code: "ab12cd".into(),
                user: user_input("u2", "Grace"),
            },
        )
        .await
        .unwrap();
        assert_eq!(joined.users.len(), 2);
        assert_eq!(joined.preferences.get("u2").map(Vec::len), Some(0));

        let rejoined = join_session(
            &state,
            JoinSessionRequest {
                code: "AB12CD".into(),
                user: user_input("u2", "Grace"),
            },
        )
        .await
        .unwrap();
        assert_eq!(rejoined.users.len(), 2);
    }

    #[tokio::test]
    async fn test_join_unknown_code_is_not_found() {
        let state = state_with_store().await;

        let err = join_session(
            &state,
            JoinSessionRequest {
                code: "ZZZZZZ".into(),
                user: user_input("u1", "Ada"),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_malformed_code_rejected_before_lookup() {
        let state = state_with_store().await;

        let err = get_session(&state, "AB").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCode(_)));
    }

    #[tokio::test]
    async fn test_update_preferences_replaces_set() {
        let state = state_with_store().await;
        create_session(
            &state,
            CreateSessionRequest {
                code: "AB12CD".into(),
                user: user_input("u1", "Ada"),
            },
        )
        .await
        .unwrap();

        update_preferences(
            &state,
            "AB12CD",
            UpdatePreferencesRequest {
                user_id: "u1".into(),
                movie_ids: vec![5, 5, 9],
            },
        )
        .await
        .unwrap();
        let updated = update_preferences(
            &state,
            "AB12CD",
            UpdatePreferencesRequest {
                user_id: "u1".into(),
                movie_ids: vec![7],
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.preferences_for("u1"), Some(&[7][..]));
    }

    #[tokio::test]
    async fn test_update_preferences_unknown_session_is_not_found() {
        let state = state_with_store().await;

        let err = update_preferences(
            &state,
            "ZZZZZZ",
            UpdatePreferencesRequest {
                user_id: "u1".into(),
                movie_ids: vec![1],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
