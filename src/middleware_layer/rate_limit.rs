use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::{
    error::AppError,
    state::AppState,
};

/// Window for registration attempts, in seconds.
const REGISTER_WINDOW_SECS: i64 = 43200;
/// Maximum registrations per IP per window.
const REGISTER_MAX_ATTEMPTS: i32 = 10;
/// Window for login attempts, in seconds.
const LOGIN_WINDOW_SECS: i64 = 900;
/// Maximum login attempts per IP per window.
const LOGIN_MAX_ATTEMPTS: i32 = 10;
/// Window for anonymous message submissions, in seconds.
const SUBMIT_WINDOW_SECS: i64 = 3600;
/// Maximum anonymous submissions per IP per window.
const SUBMIT_MAX_ATTEMPTS: i32 = 30;

/// Extracts the real IP address from the request extensions.
///
/// # Arguments
///
/// * `req` - The incoming request.
///
/// # Returns
///
/// The IP address as a string, or "unknown" if not found.
fn extract_real_ip(req: &Request<Body>) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Checks and bumps a per-IP counter in Redis.
///
/// Counter keys expire with the window; a Redis hiccup fails open so an
/// outage never locks everyone out.
async fn check_counter(
    state: &AppState,
    key: &str,
    max_attempts: i32,
    window_secs: i64,
    what: &str,
) -> Option<Response> {
    let count: Option<i32> = redis::cmd("GET")
        .arg(key)
        .query_async(&mut state.redis.clone())
        .await
        .unwrap_or(None);

    if let Some(attempts) = count {
        if attempts >= max_attempts {
            let ttl: Option<i32> = redis::cmd("TTL")
                .arg(key)
                .query_async(&mut state.redis.clone())
                .await
                .unwrap_or(None);

            return Some(
                AppError::RateLimitExceeded(format!(
                    "{} limit exceeded. Try again in {} minutes",
                    what,
                    ttl.unwrap_or(0) / 60
                ))
                .into_response(),
            );
        }
    }

    let _: () = redis::cmd("INCR")
        .arg(key)
        .query_async(&mut state.redis.clone())
        .await
        .unwrap_or(());

    let _: () = redis::cmd("EXPIRE")
        .arg(key)
        .arg(window_secs)
        .query_async(&mut state.redis.clone())
        .await
        .unwrap_or(());

    None
}

/// A middleware that rate limits user registration.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response`.
pub async fn rate_limit_register(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = extract_real_ip(&req);
    let key = format!("rate_limit:register:{}", ip);

    if let Some(rejection) = check_counter(
        &state,
        &key,
        REGISTER_MAX_ATTEMPTS,
        REGISTER_WINDOW_SECS,
        "Registration",
    )
    .await
    {
        return rejection;
    }

    next.run(req).await
}

/// A middleware that rate limits user login attempts.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response`.
pub async fn rate_limit_login(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = extract_real_ip(&req);
    let key = format!("rate_limit:login:{}", ip);

    if let Some(rejection) = check_counter(
        &state,
        &key,
        LOGIN_MAX_ATTEMPTS,
        LOGIN_WINDOW_SECS,
        "Login",
    )
    .await
    {
        return rejection;
    }

    next.run(req).await
}

/// A middleware that rate limits anonymous message submission.
///
/// The submit path has no session to key on, so the IP counter is the only
/// brake on drive-by spam.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response`.
pub async fn rate_limit_submit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = extract_real_ip(&req);
    let key = format!("rate_limit:submit:{}", ip);

    if let Some(rejection) = check_counter(
        &state,
        &key,
        SUBMIT_MAX_ATTEMPTS,
        SUBMIT_WINDOW_SECS,
        "Submission",
    )
    .await
    {
        return rejection;
    }

    next.run(req).await
}
