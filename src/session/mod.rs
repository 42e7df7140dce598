//! Session domain: codes, the session record, match derivation, and
//! pairwise compatibility analysis.

pub mod code;
pub mod compatibility;
pub mod matches;
pub mod model;

pub use self::code::{InvalidCodeError, SessionCode};
pub use self::compatibility::{MatchAnalysis, calculate_compatibility};
pub use self::matches::{MIN_MATCH_LIKES, compute_matches};
pub use self::model::{Movie, MovieId, SESSION_KEY_PREFIX, Session, User, session_key};
