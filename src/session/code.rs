//! Session code generation, normalization, and validation.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Characters a generated code is drawn from.
///
/// Uppercase letters and digits minus the glyphs `0`, `O`, `1` and `I`,
/// which are too easy to misread when a code is shared verbally or scribbled
/// on paper.
pub const CODE_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of every session code.
pub const CODE_LENGTH: usize = 6;

/// Normalize raw user input into candidate code form.
///
/// Trims surrounding whitespace, upper-cases, and strips every character
/// outside `A-Z0-9`, so inputs like `" ab-12 cd "` become `AB12CD`.
pub fn normalize(input: &str) -> String {
    input
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Whether a string is an acceptable canonical code.
///
/// Acceptance is wider than generation on purpose: any six characters of
/// `A-Z0-9` pass, so codes minted before the ambiguous glyphs were dropped
/// keep working.
pub fn is_valid(code: &str) -> bool {
    code.len() == CODE_LENGTH
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Error returned when an input cannot be normalized into a session code.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid session code `{input}`")]
pub struct InvalidCodeError {
    /// Raw input as supplied by the caller.
    pub input: String,
}

/// Canonical six-character session code.
///
/// The wrapped string is always upper-case `A-Z0-9`; construction goes
/// through [`SessionCode::generate`] or [`SessionCode::parse`], and serde
/// deserialization normalizes on the way in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct SessionCode(String);

impl SessionCode {
    /// Draw a fresh random code from [`CODE_ALPHABET`].
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let alphabet = CODE_ALPHABET.as_bytes();
        let code = (0..CODE_LENGTH)
            .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
            .collect();
        Self(code)
    }

    /// Normalize `input` and validate the result.
    pub fn parse(input: &str) -> Result<Self, InvalidCodeError> {
        let normalized = normalize(input);
        if is_valid(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(InvalidCodeError {
                input: input.to_owned(),
            })
        }
    }

    /// Canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionCode {
    type Err = InvalidCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SessionCode {
    type Error = InvalidCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionCode> for String {
    fn from(code: SessionCode) -> Self {
        code.0
    }
}

impl AsRef<str> for SessionCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_canonical() {
        for _ in 0..100 {
            let code = SessionCode::generate();
            assert!(is_valid(code.as_str()));
            assert!(code.as_str().chars().all(|c| CODE_ALPHABET.contains(c)));
        }
    }

    #[test]
    fn test_normalize_trims_uppercases_and_strips() {
        assert_eq!(normalize(" ab12cd "), "AB12CD");
        assert_eq!(normalize("ab-12 cd"), "AB12CD");
        assert_eq!(normalize("a:b!1.2#c/d"), "AB12CD");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize(" xy-z234 ");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_is_valid_accepts_ambiguous_glyphs() {
        // Legacy codes may contain 0/O/1/I even though generation skips them.
        assert!(is_valid("O0II11"));
        assert!(is_valid("AB12CD"));
    }

    #[test]
    fn test_is_valid_rejects_wrong_shapes() {
        assert!(!is_valid("AB12C")); // too short
        assert!(!is_valid("AB12CDE")); // too long
        assert!(!is_valid("ab12cd")); // lowercase
        assert!(!is_valid("AB 2CD")); // separator
        assert!(!is_valid(""));
    }

    #[test]
    fn test_parse_normalizes_before_validating() {
        let code = SessionCode::parse(" ab-12cd ").unwrap();
        assert_eq!(code.as_str(), "AB12CD");

        let err = SessionCode::parse("nope").unwrap_err();
        assert_eq!(err.input, "nope");
        assert!(SessionCode::parse("").is_err());
        assert!(SessionCode::parse("!!!!!!").is_err());
    }

    #[test]
    fn test_serde_round_trip_normalizes() {
        let code: SessionCode = serde_json::from_str("\" ab12cd \"").unwrap();
        assert_eq!(code.as_str(), "AB12CD");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"AB12CD\"");

        let too_short: Result<SessionCode, _> = serde_json::from_str("\"AB\"");
        assert!(too_short.is_err());
    }
}
