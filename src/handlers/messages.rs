use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
    Json,
};
use uuid::Uuid;
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    models::session::Session,
    services::messages as message_service,
    state::AppState,
    validation::message::validate_content,
};

/// The request payload for submitting an anonymous message.
#[derive(Deserialize)]
pub struct SubmitMessageRequest {
    pub content: String,
}

/// Submits an anonymous message to the user named in the path.
///
/// Deliberately unauthenticated; the session cookie, if present, is ignored.
#[axum::debug_handler]
pub async fn submit_message(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<SubmitMessageRequest>,
) -> Result<Response> {
    validate_content(&req.content)?;

    let message = message_service::submit_message(&state, &username, req.content).await?;

    tracing::info!("✅ Anonymous message delivered to user: {}", message.receiver_id);

    let response = sonic_rs::to_string(&sonic_rs::json!({
        "success": true,
        "message": {
            "id": message.id.to_string(),
            "content": message.content,
            "is_read": message.is_read,
            "created_at": message.created_at.to_rfc3339()
        }
    }))
    .map_err(|e| AppError::Internal(format!("Response serialization failed: {}", e)))?;

    Ok((
        StatusCode::CREATED,
        [(http::header::CONTENT_TYPE, "application/json")],
        response,
    )
        .into_response())
}

/// Lists the caller's received messages, most recent first.
#[axum::debug_handler]
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response> {
    let messages = message_service::list_messages(&state, session.user_id).await?;

    let unread = messages.iter().filter(|m| !m.is_read).count();

    let messages_json: Vec<_> = messages
        .into_iter()
        .map(|m| {
            sonic_rs::json!({
                "id": m.id.to_string(),
                "content": m.content,
                "is_read": m.is_read,
                "created_at": m.created_at.to_rfc3339()
            })
        })
        .collect();

    let response = sonic_rs::to_string(&sonic_rs::json!({
        "success": true,
        "messages": messages_json,
        "count": messages_json.len(),
        "unread": unread
    }))
    .map_err(|e| AppError::Internal(format!("Response serialization failed: {}", e)))?;

    Ok((
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, "application/json")],
        response,
    )
        .into_response())
}

/// Deletes one of the caller's messages.
#[axum::debug_handler]
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(message_id): Path<Uuid>,
) -> Result<Response> {
    message_service::delete_message(&state, session.user_id, message_id).await?;

    tracing::info!("✅ Message {} deleted by user {}", message_id, session.user_id);

    Ok((
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, "application/json")],
        r#"{"success":true,"message":"Message deleted successfully"}"#,
    )
        .into_response())
}

/// Marks one of the caller's messages as read.
#[axum::debug_handler]
pub async fn mark_message_read(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(message_id): Path<Uuid>,
) -> Result<Response> {
    message_service::mark_message_read(&state, session.user_id, message_id).await?;

    Ok((
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, "application/json")],
        r#"{"success":true,"message":"Message marked as read"}"#,
    )
        .into_response())
}
