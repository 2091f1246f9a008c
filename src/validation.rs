// Validation utilities module
// Custom validation functions for request DTOs, run before the service is called

use validator::ValidationError;

/// Maximum nickname length in characters
pub const MAX_NICKNAME_LENGTH: usize = 32;

/// Validates that a nickname is non-blank, short, and free of whitespace
pub fn validate_nickname(nickname: &str) -> Result<(), ValidationError> {
    if nickname.is_empty() {
        let mut error = ValidationError::new("nickname_required");
        error.message = Some("Nickname must not be empty".into());
        return Err(error);
    }
    if nickname.chars().count() > MAX_NICKNAME_LENGTH {
        let mut error = ValidationError::new("nickname_too_long");
        error.message = Some(
            format!("Nickname must be at most {} characters", MAX_NICKNAME_LENGTH).into(),
        );
        return Err(error);
    }
    if nickname.chars().any(char::is_whitespace) {
        let mut error = ValidationError::new("nickname_whitespace");
        error.message = Some("Nickname must not contain whitespace".into());
        return Err(error);
    }
    Ok(())
}
