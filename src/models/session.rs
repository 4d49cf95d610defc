use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a user session.
///
/// Stored as JSON in Redis under `session:{session_id}`; the `session_id`
/// itself only ever travels in the cookie. Owner-scoped handlers read the
/// identity from this payload and never re-derive it any other way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The ID of the user this session belongs to.
    pub user_id: Uuid,
    /// The username of the user this session belongs to.
    pub username: String,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
}
