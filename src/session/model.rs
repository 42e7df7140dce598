//! Core session record: membership and per-member liked movies.

use std::collections::HashSet;
use std::time::{Duration, SystemTime};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::session::code::SessionCode;

/// Storage key prefix shared by every session record.
pub const SESSION_KEY_PREFIX: &str = "session:";

/// Key under which a session record lives in any key-value backing store.
pub fn session_key(code: &SessionCode) -> String {
    format!("{SESSION_KEY_PREFIX}{code}")
}

/// Identifier of a movie in the upstream catalog, treated as opaque here.
pub type MovieId = u64;

/// Participant of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Opaque unique identifier.
    pub id: String,
    /// Display name shown to other members.
    pub username: String,
    /// Preferred genres picked during onboarding.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Free-form mood descriptor.
    #[serde(default)]
    pub vibe: String,
}

impl User {
    /// Mint a user with a random identifier and empty onboarding data.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.into(),
            genres: Vec::new(),
            vibe: String::new(),
        }
    }
}

/// Movie metadata consumed by the compatibility analyzer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Movie {
    /// Catalog identifier.
    pub id: MovieId,
    /// Title.
    pub title: String,
    /// Primary genre label.
    pub genre: String,
    /// Average rating on a ten-point scale.
    pub rating: f32,
    /// Runtime in minutes.
    pub runtime: u32,
}

/// Shared session record.
///
/// `preferences` maps member ids to their liked movies; entries appear in the
/// order they were first written and survive even when the id no longer
/// resolves to a member.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Canonical code identifying the session.
    #[schema(value_type = String)]
    pub code: SessionCode,
    /// Creation instant, carried as epoch milliseconds on the wire.
    #[serde_as(as = "serde_with::TimestampMilliSeconds<i64>")]
    #[schema(value_type = i64)]
    pub created_at: SystemTime,
    /// Members in join order; the creator is always first.
    pub users: Vec<User>,
    /// Liked movie ids per member id.
    pub preferences: IndexMap<String, Vec<MovieId>>,
}

impl Session {
    /// Create a session with `creator` as its first member.
    ///
    /// The creator's preference entry is seeded empty right away so every
    /// member always has one.
    pub fn new(code: SessionCode, creator: User) -> Self {
        let mut preferences = IndexMap::new();
        preferences.insert(creator.id.clone(), Vec::new());
        Self {
            code,
            created_at: now_epoch_millis(),
            users: vec![creator],
            preferences,
        }
    }

    /// Look up a member by id.
    pub fn user_by_id(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == user_id)
    }

    /// Whether `user_id` belongs to a member.
    pub fn is_member(&self, user_id: &str) -> bool {
        self.user_by_id(user_id).is_some()
    }

    /// Add a member unless already present, returning whether anything changed.
    ///
    /// New members start with an empty preference entry; joining again with
    /// the same id neither duplicates the member nor resets their likes.
    pub fn add_user(&mut self, user: User) -> bool {
        if self.is_member(&user.id) {
            return false;
        }
        self.preferences.insert(user.id.clone(), Vec::new());
        self.users.push(user);
        true
    }

    /// Replace the liked-movie list for `user_id` with a deduplicated copy.
    ///
    /// This is a full replacement, not a merge: callers pass the whole
    /// accumulated set every time. Ids keep their first occurrence order.
    /// The entry is created when missing, even for ids that are not members.
    pub fn set_preferences(&mut self, user_id: &str, movie_ids: Vec<MovieId>) {
        let mut seen = HashSet::with_capacity(movie_ids.len());
        let mut deduped = Vec::with_capacity(movie_ids.len());
        for movie_id in movie_ids {
            if seen.insert(movie_id) {
                deduped.push(movie_id);
            }
        }
        self.preferences.insert(user_id.to_owned(), deduped);
    }

    /// Liked movie ids recorded for `user_id`, if an entry exists.
    pub fn preferences_for(&self, user_id: &str) -> Option<&[MovieId]> {
        self.preferences.get(user_id).map(Vec::as_slice)
    }
}

/// Creation instants carry millisecond precision so a snapshot still
/// compares equal after a persistence round trip.
fn now_epoch_millis() -> SystemTime {
    let millis = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default();
    SystemTime::UNIX_EPOCH + Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::code::SessionCode;

    fn session_with_creator() -> Session {
        let code = SessionCode::parse("AB12CD").unwrap();
        Session::new(code, User::new("Ana"))
    }

    #[test]
    fn test_new_session_seeds_creator_preferences() {
        let session = session_with_creator();
        let creator_id = session.users[0].id.clone();

        assert_eq!(session.users.len(), 1);
        assert_eq!(session.preferences_for(&creator_id), Some(&[][..]));
    }

    #[test]
    fn test_add_user_is_idempotent() {
        let mut session = session_with_creator();
        let member = User::new("Ben");
        let member_id = member.id.clone();

        assert!(session.add_user(member.clone()));
        session.set_preferences(&member_id, vec![7, 9]);

        assert!(!session.add_user(member));
        assert_eq!(session.users.len(), 2);
        assert_eq!(session.preferences_for(&member_id), Some(&[7, 9][..]));
    }

    #[test]
    fn test_add_user_resets_orphaned_entry() {
        let mut session = session_with_creator();
        session.set_preferences("ghost", vec![1, 2]);

        let mut ghost = User::new("Ghost");
        ghost.id = "ghost".into();
        assert!(session.add_user(ghost));
        assert_eq!(session.preferences_for("ghost"), Some(&[][..]));
    }

    #[test]
    fn test_set_preferences_replaces_and_dedupes() {
        let mut session = session_with_creator();
        let creator_id = session.users[0].id.clone();

        session.set_preferences(&creator_id, vec![3, 1, 3, 2, 1]);
        assert_eq!(session.preferences_for(&creator_id), Some(&[3, 1, 2][..]));

        session.set_preferences(&creator_id, vec![9]);
        assert_eq!(session.preferences_for(&creator_id), Some(&[9][..]));
    }

    #[test]
    fn test_orphaned_entries_are_tolerated() {
        let mut session = session_with_creator();
        session.set_preferences("left-the-app", vec![4]);

        assert!(!session.is_member("left-the-app"));
        assert_eq!(session.preferences_for("left-the-app"), Some(&[4][..]));
    }

    #[test]
    fn test_wire_shape_uses_camel_case_and_epoch_millis() {
        let mut session = session_with_creator();
        // Pin to a whole millisecond; the wire format carries no finer grain.
        session.created_at =
            SystemTime::UNIX_EPOCH + std::time::Duration::from_millis(1_700_000_000_000);
        let value = serde_json::to_value(&session).unwrap();

        assert_eq!(value["code"], serde_json::json!("AB12CD"));
        assert_eq!(value["createdAt"], serde_json::json!(1_700_000_000_000_i64));
        assert!(value.get("created_at").is_none());
        assert!(value["preferences"].is_object());

        let back: Session = serde_json::from_value(value).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn test_fresh_session_roundtrips_without_precision_loss() {
        let session = session_with_creator();

        let back: Session =
            serde_json::from_value(serde_json::to_value(&session).unwrap()).unwrap();
        assert_eq!(back, session);
    }
}
