use crate::error::{AppError, Result};
use crate::models::user::User;
use crate::repositories::user as user_repo;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use deadpool_postgres::Pool;
use rand::{rngs::OsRng, RngCore};
use uuid::Uuid;
use zeroize::Zeroize;

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 3;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 6;

/// Hashes a password using Argon2id.
///
/// # Arguments
///
/// * `password` - The password to hash.
///
/// # Returns
///
/// A `Result` containing the hashed password.
fn hash_password(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("Salt encoding error: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(ARGON2_MEMORY_MB * 1024)
            .t_cost(ARGON2_ITERATIONS)
            .p_cost(ARGON2_PARALLELISM)
            .build()
            .map_err(|e| AppError::Internal(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    tracing::debug!("Password hashed successfully with Argon2");
    Ok(password_hash)
}

/// Verifies a password against a hash.
///
/// # Arguments
///
/// * `password` - The password to verify.
/// * `hash` - The hash to verify against.
///
/// # Returns
///
/// A `Result` containing `true` if the password is valid, `false` otherwise.
fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let mut password_bytes = password.as_bytes().to_vec();
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Hash parse error: {}", e)))?;
    let argon2 = Argon2::default();
    let result = argon2
        .verify_password(&password_bytes, &parsed_hash)
        .is_ok();

    password_bytes.zeroize();
    tracing::debug!("Password verification completed");
    Ok(result)
}

/// Registers a new user.
///
/// Pre-checks the uniqueness of the email and username so the common case
/// produces a conflict naming the colliding field. The pre-check and insert
/// are not one transaction; a lost race still surfaces as the same
/// `Conflict` through the store's unique constraints.
///
/// # Arguments
///
/// * `db` - The database connection pool.
/// * `name` - The user's display name.
/// * `email` - The user's email address.
/// * `username` - The user's username.
/// * `password` - The user's password.
///
/// # Returns
///
/// A `Result` containing the created `User`.
pub async fn register_user(
    db: &Pool,
    name: String,
    email: String,
    username: String,
    password: String,
) -> Result<User> {
    tracing::debug!("🔐 Registering user: {}", username);

    if let Some(existing) = user_repo::find_by_email_or_username(db, &email, &username).await? {
        if existing.email == email {
            return Err(AppError::Conflict("Email"));
        }
        return Err(AppError::Conflict("Username"));
    }

    let hashed_password = hash_password(&password)?;

    let user = user_repo::create_user(
        db,
        Uuid::new_v4(),
        name,
        email,
        username,
        hashed_password,
    )
    .await?;

    tracing::info!("✅ User created with ID: {}", user.id);
    Ok(user)
}

/// Authenticates a user by email and password.
///
/// An unknown email and a wrong password produce the identical error so
/// account existence never leaks through the login endpoint.
///
/// # Arguments
///
/// * `db` - The database connection pool.
/// * `email` - The user's email address.
/// * `password` - The user's password.
///
/// # Returns
///
/// A `Result` containing the authenticated `User`.
pub async fn authenticate_user(db: &Pool, email: String, password: String) -> Result<User> {
    tracing::debug!("🔐 Authenticating user by email");

    let user = user_repo::find_by_email(db, &email)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

    if !verify_password(&password, &user.password)? {
        return Err(AppError::Authentication(
            "Invalid email or password".to_string(),
        ));
    }

    tracing::info!("✅ User authenticated: {}", user.id);

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifiable() {
        let first = hash_password("correct horse battery").unwrap();
        let second = hash_password("correct horse battery").unwrap();

        // Salted digests never compare equal, yet both verify.
        assert_ne!(first, second);
        assert!(verify_password("correct horse battery", &first).unwrap());
        assert!(verify_password("correct horse battery", &second).unwrap());
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let digest = hash_password("hunter2hunter2").unwrap();
        assert!(!digest.contains("hunter2hunter2"));
        assert!(digest.starts_with("$argon2id$"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let digest = hash_password("the right one").unwrap();
        assert!(!verify_password("the wrong one", &digest).unwrap());
    }
}
