use crate::error::{AppError, Result};

/// Validates a display name.
///
/// # Arguments
///
/// * `name` - The name to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the name is valid.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("Name cannot be empty".to_string()));
    }

    if name.chars().count() > 100 {
        return Err(AppError::Validation(
            "Name must be at most 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates an email address.
///
/// # Arguments
///
/// * `email` - The email address to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the email is valid.
pub fn validate_email(email: &str) -> Result<()> {
    if email.len() > 255 {
        return Err(AppError::Validation(
            "Email must be at most 255 characters".to_string(),
        ));
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    if local.is_empty()
        || domain.is_empty()
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
        || domain.contains('@')
    {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    Ok(())
}

/// Validates a username.
///
/// # Arguments
///
/// * `username` - The username to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the username is valid.
pub fn validate_username(username: &str) -> Result<()> {
    if username.len() < 3 {
        return Err(AppError::Validation(
            "Username must be at least 3 characters long".to_string(),
        ));
    }

    if username.len() > 30 {
        return Err(AppError::Validation(
            "Username must be at most 30 characters".to_string(),
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::Validation(
            "Username can only contain letters, numbers, underscores, and hyphens".to_string(),
        ));
    }

    Ok(())
}

/// Validates a password.
///
/// # Arguments
///
/// * `password` - The password to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the password is valid.
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be at most 128 characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rejects_blank() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("Ada Lovelace").is_ok());
    }

    #[test]
    fn email_accepts_common_shapes() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last@sub.example.co").is_ok());
    }

    #[test]
    fn email_rejects_malformed() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email("user@.leadingdot").is_err());
        assert!(validate_email("user @example.com").is_err());
        assert!(validate_email("a@b@example.com").is_err());
    }

    #[test]
    fn username_enforces_charset_and_bounds() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"x".repeat(31)).is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("dots.not.ok").is_err());
        assert!(validate_username("good_name-42").is_ok());
    }

    #[test]
    fn password_enforces_length_bounds() {
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(129)).is_err());
        assert!(validate_password("longenough").is_ok());
    }
}
