pub mod auth;
pub mod error;
pub mod reference;
pub mod votes;

pub use error::{ApiError, ApiResult};

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::state::AppState;

pub const SESSION_HEADER: &str = "X-Session-Token";

pub(crate) fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok())
}

/// Resolve the caller from the session header, rejecting anonymous requests
pub(crate) fn get_user_from_headers(state: &AppState, headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let token = session_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))?;

    state
        .get_authenticated_user_id_from_token(token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid session token".to_string()))
}
