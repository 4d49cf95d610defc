use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::message::Message,
    repositories::{message as message_repo, user as user_repo},
    state::AppState,
};

/// Submits an anonymous message to a user, addressed by username.
///
/// This is the one unauthenticated write path in the system: no session is
/// consulted and nothing about the submitter is recorded.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `receiver_username` - The username of the receiver.
/// * `content` - The message content.
///
/// # Returns
///
/// A `Result` containing the created `Message`.
pub async fn submit_message(
    state: &AppState,
    receiver_username: &str,
    content: String,
) -> Result<Message> {
    let receiver = user_repo::find_by_username(&state.db, receiver_username)
        .await?
        .ok_or(AppError::NotFound)?;

    message_repo::create_message(&state.db, Uuid::new_v4(), content, receiver.id).await
}

/// Lists the messages received by a user, most recent first.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `user_id` - The ID of the receiver.
///
/// # Returns
///
/// A `Result` containing the messages.
pub async fn list_messages(state: &AppState, user_id: Uuid) -> Result<Vec<Message>> {
    message_repo::list_by_receiver(&state.db, user_id).await
}

/// Deletes a message owned by the given user.
///
/// Resolves the message through the ownership-scoped lookup first, so a
/// foreign message reads as `NotFound` rather than a distinct "forbidden".
///
/// # Arguments
///
/// * `state` - The application state.
/// * `user_id` - The ID of the caller.
/// * `message_id` - The ID of the message to delete.
///
/// # Returns
///
/// A `Result<()>`.
pub async fn delete_message(state: &AppState, user_id: Uuid, message_id: Uuid) -> Result<()> {
    message_repo::find_owned(&state.db, message_id, user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    message_repo::delete_message(&state.db, message_id).await
}

/// Marks a message owned by the given user as read.
///
/// Idempotent: marking an already-read message succeeds again.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `user_id` - The ID of the caller.
/// * `message_id` - The ID of the message to mark.
///
/// # Returns
///
/// A `Result<()>`.
pub async fn mark_message_read(state: &AppState, user_id: Uuid, message_id: Uuid) -> Result<()> {
    message_repo::find_owned(&state.db, message_id, user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    message_repo::mark_read(&state.db, message_id).await
}
