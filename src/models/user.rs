use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Represents a user in the system.
///
/// The `password` field holds the Argon2 digest, never the plaintext. It is
/// deliberately absent from every serialized response shape; only the
/// repository and auth service ever see it.
#[derive(Clone, Debug)]
pub struct User {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's display name.
    pub name: String,
    /// The user's email address, unique, used as the login identifier.
    pub email: String,
    /// The user's username, unique, used as the public profile slug.
    pub username: String,
    /// The user's hashed password.
    pub password: String,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the user was last updated.
    pub updated_at: DateTime<Utc>,
}
