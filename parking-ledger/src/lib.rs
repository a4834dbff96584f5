//! parking-ledger library - visit ledger and reporting service
//!
//! Records vehicle entries per date, answers visit statistics and exports
//! them as spreadsheets. The HTTP layer is thin: handlers validate request
//! fields and delegate to [`db`] and [`report`].

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod report;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Ledger connection pool
    pub db: SqlitePool,
    /// Shared password for the API gate; empty disables the gate
    pub password: String,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, password: impl Into<String>) -> Self {
        Self {
            db,
            password: password.into(),
        }
    }
}

/// Build application router
///
/// `/health` is public; everything under `/api` sits behind the password gate.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post};

    let protected = Router::new()
        .route("/api/overview", get(api::overview))
        .route("/api/plates", get(api::list_plates))
        .route("/api/plates/stats", get(api::get_plate_stats))
        .route("/api/roster", get(api::get_roster))
        .route("/api/history", get(api::get_history))
        .route("/api/visits", post(api::add_visits))
        .route("/api/visits/:id", delete(api::remove_visit))
        .route("/api/export", get(api::export_report))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::password_gate,
        ));

    let public = Router::new().merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
