//! Spreadsheet download

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use parking_common::time::today;
use serde::Deserialize;
use tracing::info;

use super::require_date;
use crate::report::xlsx::{render, XLSX_CONTENT_TYPE};
use crate::report::{compile_day_report, compile_full_report, ReportScope};
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// `day` (default) or `all`
    pub scope: Option<String>,
    pub date: Option<String>,
}

/// GET /api/export?scope=day|all&date=
///
/// `scope=day` without a date exports the full history.
pub async fn export_report(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let scope = match ReportScope::from_request(query.scope.as_deref(), query.date.as_deref())? {
        ReportScope::Day(raw) => ReportScope::Day(require_date(&raw)?),
        ReportScope::All => ReportScope::All,
    };

    let document = match &scope {
        ReportScope::Day(date) => compile_day_report(&state.db, date).await?,
        ReportScope::All => compile_full_report(&state.db).await?,
    };

    let bytes = render(&document)?;
    let filename = scope.filename(&today());
    info!("Exporting {} ({} bytes)", filename, bytes.len());

    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
