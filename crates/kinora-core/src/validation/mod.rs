//! Validation helpers for values that become object-store key segments.

use crate::error::AppError;

pub const MAX_FILE_NAME_LENGTH: usize = 255;
pub const MAX_OWNER_ID_LENGTH: usize = 255;

/// Validate a declared upload file name.
///
/// The name becomes the last segment of `{owner}/{record}/{file}` so it must be a single
/// non-empty path component without control characters.
pub fn validate_file_name(file_name: &str) -> Result<(), AppError> {
    if file_name.trim().is_empty() {
        return Err(AppError::InvalidInput("file_name is required".to_string()));
    }
    if file_name.len() > MAX_FILE_NAME_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "file_name must be at most {} bytes",
            MAX_FILE_NAME_LENGTH
        )));
    }
    validate_segment("file_name", file_name)
}

/// Validate an owner identifier used as the first key segment.
pub fn validate_owner_id(owner_id: &str) -> Result<(), AppError> {
    if owner_id.trim().is_empty() {
        return Err(AppError::InvalidInput("owner_id is required".to_string()));
    }
    if owner_id.len() > MAX_OWNER_ID_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "owner_id must be at most {} bytes",
            MAX_OWNER_ID_LENGTH
        )));
    }
    validate_segment("owner_id", owner_id)
}

fn validate_segment(field: &str, value: &str) -> Result<(), AppError> {
    if value == "." || value == ".." {
        return Err(AppError::InvalidInput(format!(
            "{} must not be a relative path component",
            field
        )));
    }
    if value.contains('/') || value.contains('\\') {
        return Err(AppError::InvalidInput(format!(
            "{} must not contain path separators",
            field
        )));
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(AppError::InvalidInput(format!(
            "{} must not contain control characters",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_file_names() {
        assert!(validate_file_name("clip.mp4").is_ok());
        assert!(validate_file_name("my holiday (1).MOV").is_ok());
        assert!(validate_file_name("README").is_ok());
    }

    #[test]
    fn test_rejected_file_names() {
        for name in ["", "   ", "..", ".", "a/b.mp4", "a\\b.mp4", "bad\nname"] {
            assert!(validate_file_name(name).is_err(), "{name:?} should be rejected");
        }
        assert!(validate_file_name(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_owner_id() {
        assert!(validate_owner_id("user-42").is_ok());
        assert!(validate_owner_id("").is_err());
        assert!(validate_owner_id("a/b").is_err());
    }
}
