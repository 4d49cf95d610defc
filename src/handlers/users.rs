use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    error::{AppError, Result},
    repositories::user as user_repo,
    state::AppState,
};

/// Returns the public profile for a username.
///
/// This is what the shareable profile link resolves against. Only the display
/// name and username go out; the email stays private.
#[axum::debug_handler]
pub async fn public_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Response> {
    let user = user_repo::find_by_username(&state.db, &username)
        .await?
        .ok_or(AppError::NotFound)?;

    let response = sonic_rs::to_string(&sonic_rs::json!({
        "success": true,
        "user": {
            "name": user.name,
            "username": user.username
        }
    }))
    .map_err(|e| AppError::Internal(format!("Response serialization failed: {}", e)))?;

    Ok((
        StatusCode::OK,
        [(http::header::CONTENT_TYPE, "application/json")],
        response,
    )
        .into_response())
}
