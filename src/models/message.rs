use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

/// Represents an anonymous message in the system.
///
/// There is no sender column anywhere in the schema; anonymity is structural,
/// not a redaction applied on the way out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// The unique identifier for the message.
    pub id: Uuid,
    /// The message content.
    pub content: String,
    /// The ID of the user who received the message.
    pub receiver_id: Uuid,
    /// Whether the receiver has marked the message as read.
    pub is_read: bool,
    /// The timestamp when the message was created.
    pub created_at: DateTime<Utc>,
}

impl From<&Row> for Message {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            content: row.get("content"),
            receiver_id: row.get("receiver_id"),
            is_read: row.get("is_read"),
            created_at: row.get("created_at"),
        }
    }
}
