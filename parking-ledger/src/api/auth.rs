//! Shared-password gate
//!
//! One password for the whole facility, sent in the `X-Parking-Password`
//! header on every `/api` request. An empty configured password disables
//! the gate entirely.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{ApiError, AppState};

/// Header carrying the shared password
pub const PASSWORD_HEADER: &str = "x-parking-password";

/// Reject requests whose password header doesn't match
pub async fn password_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.password.is_empty() {
        return Ok(next.run(request).await);
    }

    let provided = request
        .headers()
        .get(PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided != Some(state.password.as_str()) {
        warn!(
            "Rejected {} {}: {}",
            request.method(),
            request.uri().path(),
            if provided.is_some() { "wrong password" } else { "no password" }
        );
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}
