use deadpool_postgres::Pool;
use uuid::Uuid;
use crate::{
    error::Result,
    models::message::Message,
};

/// Creates a new message in the database.
///
/// No sender is recorded; the row only ever references the receiver.
pub async fn create_message(
    pool: &Pool,
    id: Uuid,
    content: String,
    receiver_id: Uuid,
) -> Result<Message> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO messages (id, content, receiver_id)
            VALUES ($1, $2, $3)
            RETURNING id, content, receiver_id, is_read, created_at
            "#,
            &[&id, &content, &receiver_id],
        )
        .await?;
    Ok(Message::from(&row))
}

/// Lists all messages for a receiver, most recent first.
///
/// The ordering is part of the contract and not configurable.
pub async fn list_by_receiver(pool: &Pool, receiver_id: Uuid) -> Result<Vec<Message>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, content, receiver_id, is_read, created_at
            FROM messages
            WHERE receiver_id = $1
            ORDER BY created_at DESC
            "#,
            &[&receiver_id],
        )
        .await?;
    Ok(rows.iter().map(Message::from).collect())
}

/// Finds a message by ID, scoped to its receiver.
///
/// This is the sole authorization primitive for message mutations: a message
/// owned by someone else resolves to `None` exactly like an absent one, so
/// callers cannot distinguish foreign rows from missing rows.
pub async fn find_owned(
    pool: &Pool,
    id: Uuid,
    receiver_id: Uuid,
) -> Result<Option<Message>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, content, receiver_id, is_read, created_at
            FROM messages
            WHERE id = $1 AND receiver_id = $2
            "#,
            &[&id, &receiver_id],
        )
        .await?;
    Ok(row.as_ref().map(Message::from))
}

/// Marks a message as read. Idempotent: re-setting an already-read message
/// succeeds and leaves the flag true.
pub async fn mark_read(pool: &Pool, id: Uuid) -> Result<()> {
    let client = pool.get().await?;
    client
        .execute(
            r#"
            UPDATE messages
            SET is_read = true
            WHERE id = $1
            "#,
            &[&id],
        )
        .await?;
    Ok(())
}

/// Deletes a message.
pub async fn delete_message(pool: &Pool, id: Uuid) -> Result<()> {
    let client = pool.get().await?;
    client
        .execute(
            r#"
            DELETE FROM messages
            WHERE id = $1
            "#,
            &[&id],
        )
        .await?;
    Ok(())
}
