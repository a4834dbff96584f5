//! Read-only views: overview, roster, plate statistics, history

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    Json,
};
use parking_common::db::models::{DailyRoster, PlateStats, RosterEntry};
use parking_common::time::today;
use parking_common::{normalize, PlateIdentity};
use serde::{Deserialize, Serialize};

use super::require_date;
use crate::{db, ApiError, ApiResult, AppState};

/// Query parameters for the overview page
#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    /// Date to list; defaults to today
    pub view_date: Option<String>,
    /// Plate to look up, as typed
    pub q: Option<String>,
}

/// Outcome of a plate lookup typed by the operator
#[derive(Debug, Serialize)]
pub struct PlateSearch {
    pub query: String,
    /// False when the text is not a plate at all
    pub valid: bool,
    pub stats: Option<PlateStats>,
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub today: String,
    pub view_date: String,
    /// Every plate ever recorded, for autocomplete
    pub all_plates: Vec<PlateIdentity>,
    pub day_rows: Vec<RosterEntry>,
    pub day_count: usize,
    pub search: Option<PlateSearch>,
}

/// GET /api/overview
///
/// Everything the operator's main screen shows in one response.
pub async fn overview(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> ApiResult<Json<OverviewResponse>> {
    let today = today();
    let view_date = match query.view_date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => require_date(raw)?,
        _ => today.clone(),
    };

    let all_plates = db::all_distinct_plates(&state.db).await?;
    let roster = db::daily_roster(&state.db, &view_date).await?;

    let search = match query.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => Some(match normalize(q) {
            Ok(plate) => PlateSearch {
                query: q.to_string(),
                valid: true,
                stats: Some(db::plate_stats(&state.db, &plate).await?),
            },
            Err(_) => PlateSearch {
                query: q.to_string(),
                valid: false,
                stats: None,
            },
        }),
        _ => None,
    };

    Ok(Json(OverviewResponse {
        today,
        view_date,
        all_plates,
        day_count: roster.len(),
        day_rows: roster.entries,
        search,
    }))
}

/// GET /api/plates
pub async fn list_plates(State(state): State<AppState>) -> ApiResult<Json<Vec<PlateIdentity>>> {
    Ok(Json(db::all_distinct_plates(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct PlateQuery {
    pub plate: Option<String>,
}

/// GET /api/plates/stats?plate=
///
/// Unknown plates get zero-count stats; text that isn't a plate is a 400.
pub async fn get_plate_stats(
    State(state): State<AppState>,
    Query(query): Query<PlateQuery>,
) -> ApiResult<Json<PlateStats>> {
    let raw = query
        .plate
        .ok_or_else(|| ApiError::BadRequest("plate is required".to_string()))?;
    let plate = normalize(&raw).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(db::plate_stats(&state.db, &plate).await?))
}

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    pub date: Option<String>,
}

/// GET /api/roster?date=
pub async fn get_roster(
    State(state): State<AppState>,
    Query(query): Query<RosterQuery>,
) -> ApiResult<Json<DailyRoster>> {
    let date = match query.date.as_deref() {
        Some(raw) => require_date(raw)?,
        None => today(),
    };

    Ok(Json(db::daily_roster(&state.db, &date).await?))
}

/// GET /api/history
pub async fn get_history(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<String, Vec<PlateIdentity>>>> {
    Ok(Json(db::history_grouped_by_date(&state.db).await?))
}
