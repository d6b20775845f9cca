use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};
use civic_types::{ContentKind, TallyResponse, VoteDirection, VoteRequest, VoteResponse};

use super::{get_user_from_headers, ApiError, ApiResult};
use crate::db::repositories::VoteRepository;
use crate::state::AppState;

fn parse_target(kind: &str, item_id: &str) -> Result<(ContentKind, String), ApiError> {
    let kind = ContentKind::parse(kind).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Unknown content kind '{}'. Use 'politician', 'post', 'poll' or 'fact_check'",
            kind
        ))
    })?;
    let item_id = item_id.trim();
    if item_id.is_empty() {
        return Err(ApiError::BadRequest("Item ID cannot be empty".to_string()));
    }
    Ok((kind, item_id.to_string()))
}

/// GET /votes/:kind/:id - Current counts, plus the caller's vote when signed in
pub async fn get_tally(
    State(state): State<AppState>,
    Path((kind, item_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<Json<TallyResponse>> {
    let (kind, item_id) = parse_target(&kind, &item_id)?;
    let viewer = get_user_from_headers(&state, &headers).ok();

    let tally = VoteRepository::new(state.db.pool.clone()).tally(kind, &item_id, viewer.as_ref())?;
    Ok(Json(tally))
}

/// POST /votes/:kind/:id - Cast, change or withdraw a vote
///
/// The session is checked before the target or body, so anonymous callers
/// always get 401.
pub async fn cast_vote(
    State(state): State<AppState>,
    Path((kind, item_id)): Path<(String, String)>,
    headers: HeaderMap,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> ApiResult<Json<VoteResponse>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    let (kind, item_id) = parse_target(&kind, &item_id)?;
    let Json(payload) =
        payload.map_err(|e| ApiError::BadRequest(format!("Invalid vote body: {}", e.body_text())))?;

    let direction = VoteDirection::parse(&payload.direction)
        .ok_or_else(|| ApiError::BadRequest("Invalid vote direction. Use 'up' or 'down'".to_string()))?;

    let repo = VoteRepository::new(state.db.pool.clone());
    let transition = repo.cast(&user_id, kind, &item_id, direction)?;
    let tally = repo.tally(kind, &item_id, Some(&user_id))?;

    tracing::debug!(
        "User {} vote on {}/{}: {}",
        user_id,
        kind.as_str(),
        item_id,
        transition.as_str()
    );

    Ok(Json(VoteResponse {
        item_kind: kind,
        item_id,
        transition,
        direction,
        upvotes: tally.upvotes,
        downvotes: tally.downvotes,
    }))
}
