use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::session::Session,
    state::AppState,
};

use redis::AsyncCommands;

/// Extracts the session token from the request cookies.
///
/// # Arguments
///
/// * `cookies` - The request cookies.
///
/// # Returns
///
/// An `Option` containing the session ID if found.
fn extract_session_token(cookies: &Cookies) -> Option<Uuid> {
    cookies
        .get("session_id")
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// A middleware that requires a valid session to be present.
///
/// On success the deserialized `Session` is inserted as a request extension;
/// downstream handlers take their identity from it and nowhere else.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `cookies` - The request cookies.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response`; failures render the uniform error envelope via `AppError`.
pub async fn require_auth(
    State(mut state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    tracing::debug!("🔐 Checking authentication...");

    let session_id = extract_session_token(&cookies)
        .ok_or_else(|| {
            tracing::warn!("❌ No session_id cookie found");
            AppError::Unauthorized.into_response()
        })?;

    tracing::debug!("🔑 Found session_id: {}", session_id);

    let session_json: String = state
        .redis
        .get(format!("session:{}", session_id))
        .await
        .map_err(|e| {
            tracing::warn!("❌ Redis error or session not found: {}", e);
            AppError::Unauthorized.into_response()
        })?;

    let session: Session = sonic_rs::from_str(&session_json)
        .map_err(|e| {
            tracing::warn!("❌ Invalid session JSON: {}", e);
            AppError::Unauthorized.into_response()
        })?;

    if chrono::Utc::now() > session.expires_at {
        tracing::warn!("❌ Session expired for user: {}", session.user_id);

        let _: () = state
            .redis
            .del(format!("session:{}", session_id))
            .await
            .unwrap_or(());

        return Err(AppError::Unauthorized.into_response());
    }

    tracing::debug!("✅ User authenticated: {}", session.user_id);

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
