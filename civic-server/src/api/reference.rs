use axum::{
    extract::{Query, State},
    Json,
};
use civic_types::{JurisdictionLevel, Office, Region};
use serde::Deserialize;

use super::{ApiError, ApiResult};
use crate::db::repositories::{OfficeRepository, RegionRepository};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegionQuery {
    #[serde(default)]
    group: Option<String>,
}

#[derive(Deserialize)]
pub struct OfficeQuery {
    #[serde(default)]
    level: Option<String>,
}

/// GET /regions - List regions, optionally within one group
pub async fn list_regions(
    State(state): State<AppState>,
    Query(query): Query<RegionQuery>,
) -> ApiResult<Json<Vec<Region>>> {
    let group = query.group.as_deref().map(str::trim).filter(|g| !g.is_empty());
    let regions = RegionRepository::new(state.db.pool.clone()).list(group)?;
    Ok(Json(regions))
}

/// GET /offices - List office types, optionally at one jurisdiction level
pub async fn list_offices(
    State(state): State<AppState>,
    Query(query): Query<OfficeQuery>,
) -> ApiResult<Json<Vec<Office>>> {
    let level = match query.level.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(JurisdictionLevel::parse(raw).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Invalid level '{}'. Use 'federal', 'state' or 'local'",
                raw
            ))
        })?),
    };

    let offices = OfficeRepository::new(state.db.pool.clone()).list(level)?;
    Ok(Json(offices))
}
