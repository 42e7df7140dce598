//! Pairwise taste-compatibility analysis over liked movies.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::session::model::Movie;

/// Weight of the common-movies component in the final score.
const COMMON_MOVIES_WEIGHT: f32 = 40.0;
/// Weight of the shared-genres component in the final score.
const SHARED_GENRES_WEIGHT: f32 = 35.0;
/// Weight of the rating-similarity component in the final score.
const RATING_SIMILARITY_WEIGHT: f32 = 25.0;

/// Outcome of comparing two members' liked movies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchAnalysis {
    /// Compatibility score between 0 and 100.
    pub compatibility: u8,
    /// Genres both members like, in the first member's discovery order.
    pub shared_genres: Vec<String>,
    /// Absolute difference between the members' average liked ratings.
    pub average_rating_diff: f32,
    /// Number of movies both members liked.
    pub common_movies: usize,
    /// Human-readable verdict for the score tier.
    pub message: String,
}

/// Score how compatible two members' movie tastes are.
///
/// The score blends three signals: movies both liked (40%), genres both
/// like (35%), and how close their average liked ratings sit on the
/// ten-point scale (25%). Either list being empty short-circuits to zero.
pub fn calculate_compatibility(user_liked: &[Movie], friend_liked: &[Movie]) -> MatchAnalysis {
    if user_liked.is_empty() || friend_liked.is_empty() {
        return MatchAnalysis {
            compatibility: 0,
            shared_genres: Vec::new(),
            average_rating_diff: 0.0,
            common_movies: 0,
            message: "Not enough data to calculate compatibility".into(),
        };
    }

    let user_movie_ids: IndexSet<_> = user_liked.iter().map(|movie| movie.id).collect();
    let common_movies = friend_liked
        .iter()
        .filter(|movie| user_movie_ids.contains(&movie.id))
        .count();

    let user_genres: IndexSet<&str> = user_liked.iter().map(|movie| movie.genre.as_str()).collect();
    let friend_genres: IndexSet<&str> = friend_liked
        .iter()
        .map(|movie| movie.genre.as_str())
        .collect();
    let shared_genres: Vec<String> = user_genres
        .iter()
        .filter(|genre| friend_genres.contains(**genre))
        .map(|genre| (*genre).to_owned())
        .collect();

    let user_avg_rating = average_rating(user_liked);
    let friend_avg_rating = average_rating(friend_liked);
    let rating_diff = (user_avg_rating - friend_avg_rating).abs();

    let total_movies = user_liked.len().max(friend_liked.len());
    let common_movie_score = (common_movies as f32 / total_movies as f32) * COMMON_MOVIES_WEIGHT;

    let total_genres = user_genres.union(&friend_genres).count();
    let shared_genre_score =
        (shared_genres.len() as f32 / total_genres as f32) * SHARED_GENRES_WEIGHT;

    let rating_similarity = ((10.0 - rating_diff) / 10.0).max(0.0) * RATING_SIMILARITY_WEIGHT;

    let compatibility = (common_movie_score + shared_genre_score + rating_similarity)
        .min(100.0)
        .round() as u8;

    MatchAnalysis {
        compatibility,
        shared_genres,
        average_rating_diff: rating_diff,
        common_movies,
        message: message_for(compatibility).into(),
    }
}

fn average_rating(movies: &[Movie]) -> f32 {
    movies.iter().map(|movie| movie.rating).sum::<f32>() / movies.len() as f32
}

fn message_for(compatibility: u8) -> &'static str {
    match compatibility {
        80.. => "You're movie soulmates! Perfect taste alignment! 🎬✨",
        60.. => "Great match! You'll have awesome movie nights together! 🍿",
        40.. => "Good compatibility! Some overlap in your movie tastes.",
        20.. => "You have different tastes, but that's what makes it interesting!",
        _ => "Very different preferences - time to introduce each other to new genres!",
    }
}
