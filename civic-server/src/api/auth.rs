use axum::{extract::State, http::HeaderMap, Json};
use civic_types::{LoginRequest, LoginResponse, User};

use super::{get_user_from_headers, session_token, ApiError, ApiResult};
use crate::db::repositories::UserRepository;
use crate::state::AppState;

/// POST /auth/login - Exchange email and password for a session token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let repo = UserRepository::new(state.db.pool.clone());
    let user = repo
        .authenticate(payload.email.trim(), &payload.password)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let session_token = state.session_manager.create_session(user.id)?;
    tracing::info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        user,
        session_token,
    }))
}

/// POST /auth/logout - Invalidate the caller's session
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let token = session_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))?;

    state.session_manager.delete_session(token)?;

    Ok(Json(serde_json::json!({
        "message": "Logged out successfully"
    })))
}

/// GET /auth/validate - Return the user behind a live session
pub async fn validate_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<User>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    let repo = UserRepository::new(state.db.pool.clone());
    let user = repo
        .get_by_id(&user_id)?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    Ok(Json(user))
}
