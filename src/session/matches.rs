//! Match derivation over a session's recorded preferences.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::session::model::{MovieId, Session};

/// Minimum number of members that must like a movie for it to match.
pub const MIN_MATCH_LIKES: usize = 2;

/// Derive the movies liked by at least [`MIN_MATCH_LIKES`] members.
///
/// Returns movie ids mapped to the display names of their likers. Usernames
/// follow the session's member insertion order; preference entries whose id
/// no longer resolves to a member are skipped silently. The threshold counts
/// distinct usernames, so members sharing a display name cannot clear it on
/// their own. The result is recomputed from the session snapshot on every
/// call and never persisted.
pub fn compute_matches(session: &Session) -> IndexMap<MovieId, Vec<String>> {
    let mut likers: IndexMap<MovieId, Vec<String>> = IndexMap::new();

    for (user_id, movie_ids) in &session.preferences {
        let Some(user) = session.user_by_id(user_id) else {
            continue;
        };
        for movie_id in movie_ids {
            likers
                .entry(*movie_id)
                .or_default()
                .push(user.username.clone());
        }
    }

    likers.retain(|_, usernames| {
        let distinct: HashSet<&str> = usernames.iter().map(String::as_str).collect();
        distinct.len() >= MIN_MATCH_LIKES
    });
    likers
}
