//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::session::code::{self, CODE_LENGTH};

/// Validates that an input can be normalized into a session code.
///
/// Normalization (trim, uppercase, strip separators) runs before the check,
/// so user-typed forms like `" ab-12cd "` are accepted.
///
/// # Examples
///
/// ```ignore
/// validate_session_code("AB12CD")    // Ok
/// validate_session_code(" ab12cd ")  // Ok - normalized first
/// validate_session_code("AB12")      // Err - too short
/// ```
pub fn validate_session_code(raw: &str) -> Result<(), ValidationError> {
    let normalized = code::normalize(raw);
    if !code::is_valid(&normalized) {
        let mut err = ValidationError::new("session_code");
        err.message = Some(
            format!("Session code must normalize to exactly {CODE_LENGTH} characters of A-Z0-9")
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_session_code_valid() {
        assert!(validate_session_code("AB12CD").is_ok());
        assert!(validate_session_code("ab12cd").is_ok());
        assert!(validate_session_code(" ab-12 cd ").is_ok());
        assert!(validate_session_code("O0II11").is_ok()); // legacy glyphs
    }

    #[test]
    fn test_validate_session_code_invalid() {
        assert!(validate_session_code("AB12C").is_err()); // too short
        assert!(validate_session_code("AB12CDE").is_err()); // too long
        assert!(validate_session_code("").is_err()); // empty
        assert!(validate_session_code("!!!---").is_err()); // strips to nothing
    }
}
