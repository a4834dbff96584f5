//! Visit recording and deletion

use axum::{
    extract::{Path, State},
    Json,
};
use parking_common::db::models::{InsertSummary, VisitEvent};
use serde::{Deserialize, Serialize};

use super::require_date;
use crate::{db, ApiResult, AppState};

/// Body of POST /api/visits
#[derive(Debug, Deserialize)]
pub struct AddVisitsRequest {
    pub date: String,
    /// Raw plate strings as typed; normalized server-side
    #[serde(default)]
    pub plates: Vec<String>,
    #[serde(default)]
    pub memo: String,
}

#[derive(Debug, Serialize)]
pub struct AddVisitsResponse {
    pub date: String,
    #[serde(flatten)]
    pub summary: InsertSummary,
    pub message: String,
}

/// POST /api/visits
///
/// Always answers with the added/duplicated/invalid breakdown, even when
/// nothing was added.
pub async fn add_visits(
    State(state): State<AppState>,
    Json(request): Json<AddVisitsRequest>,
) -> ApiResult<Json<AddVisitsResponse>> {
    let date = require_date(&request.date)?;

    let summary =
        db::insert_visits_with_memo(&state.db, &date, request.plates.as_slice(), &request.memo).await?;

    Ok(Json(AddVisitsResponse {
        date,
        message: summary.message(),
        summary,
    }))
}

#[derive(Debug, Serialize)]
pub struct DeleteVisitResponse {
    pub id: i64,
    pub deleted: bool,
    /// The row that was removed, if any
    pub visit: Option<VisitEvent>,
}

/// DELETE /api/visits/:id
///
/// Deleting an unknown id is not an error; `deleted` is simply false.
pub async fn remove_visit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteVisitResponse>> {
    let visit = db::get_visit(&state.db, id).await?;
    let deleted = db::delete_visit(&state.db, id).await?;

    Ok(Json(DeleteVisitResponse {
        id,
        deleted,
        visit: visit.filter(|_| deleted),
    }))
}
