//! HTTP API handlers for parking-ledger

pub mod auth;
pub mod export;
pub mod health;
pub mod queries;
pub mod visits;

pub use auth::{password_gate, PASSWORD_HEADER};
pub use export::export_report;
pub use health::health_routes;
pub use queries::{get_history, get_plate_stats, get_roster, list_plates, overview};
pub use visits::{add_visits, remove_visit};

use parking_common::time::parse_date;

use crate::ApiError;

/// Validate a client-supplied `YYYY-MM-DD` date
pub(crate) fn require_date(raw: &str) -> Result<String, ApiError> {
    parse_date(raw).ok_or_else(|| ApiError::BadRequest(format!("Invalid date: {:?}", raw)))
}
