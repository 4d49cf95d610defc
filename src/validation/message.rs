use crate::error::{AppError, Result};

/// The maximum message length, in characters.
const MAX_CONTENT_CHARS: usize = 1000;

/// Validates message content.
///
/// Bounds are counted in characters, not bytes, so multi-byte text is not
/// penalized.
pub fn validate_content(content: &str) -> Result<()> {
    if content.is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }

    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::Validation(
            "Message must be less than 1000 characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_rejects_empty() {
        assert!(validate_content("").is_err());
    }

    #[test]
    fn content_accepts_boundaries() {
        assert!(validate_content("a").is_ok());
        assert!(validate_content(&"b".repeat(1000)).is_ok());
    }

    #[test]
    fn content_rejects_over_limit() {
        assert!(validate_content(&"c".repeat(1001)).is_err());
    }

    #[test]
    fn content_counts_chars_not_bytes() {
        // 1000 multi-byte characters is within bounds even though it is
        // more than 1000 bytes.
        assert!(validate_content(&"é".repeat(1000)).is_ok());
    }
}
