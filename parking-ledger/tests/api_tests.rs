//! Integration tests for parking-ledger API endpoints
//!
//! Tests cover:
//! - Health endpoint (no password required)
//! - Password gate on `/api`
//! - Visit recording and deletion
//! - Plate lookups, roster and overview
//! - Spreadsheet export headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use parking_common::db::init::init_memory_database;
use parking_ledger::api::PASSWORD_HEADER;
use parking_ledger::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: fresh in-memory ledger
async fn setup_test_db() -> SqlitePool {
    init_memory_database()
        .await
        .expect("Should create in-memory ledger")
}

/// Test helper: app with the password gate disabled
fn setup_app(db: SqlitePool) -> axum::Router {
    build_router(AppState::new(db, ""))
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: POST a batch and return the response body
async fn add_visits(app: &axum::Router, date: &str, plates: &[&str]) -> Value {
    let request = json_request(
        "POST",
        "/api/visits",
        json!({ "date": date, "plates": plates }),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    extract_json(response.into_body()).await
}

// =============================================================================
// Health and password gate
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let db = setup_test_db().await;
    let app = build_router(AppState::new(db, "secret"));

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "parking-ledger");
    assert!(body["version"].is_string());
    assert!(body["build"].is_string());
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());
    db.close().await;

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "unreachable");
}

#[tokio::test]
async fn test_api_rejects_missing_or_wrong_password() {
    let db = setup_test_db().await;
    let app = build_router(AppState::new(db, "secret"));

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/plates"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let request = Request::builder()
        .uri("/api/plates")
        .header(PASSWORD_HEADER, "guess")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_accepts_correct_password() {
    let db = setup_test_db().await;
    let app = build_router(AppState::new(db, "secret"));

    let request = Request::builder()
        .uri("/api/plates")
        .header(PASSWORD_HEADER, "secret")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Visits
// =============================================================================

#[tokio::test]
async fn test_add_visits_reports_summary() {
    let app = setup_app(setup_test_db().await);

    let body = add_visits(&app, "2024-01-01", &["11저8604", " 145마 9820 ", "bad-plate"]).await;
    assert_eq!(body["date"], "2024-01-01");
    assert_eq!(body["added"], 2);
    assert_eq!(body["duplicated"], 0);
    assert_eq!(body["invalid"], 1);
    assert_eq!(body["message"], "added 2, duplicated 0, invalid 1");

    let body = add_visits(&app, "2024-01-01", &["11저 8604"]).await;
    assert_eq!(body["added"], 0);
    assert_eq!(body["duplicated"], 1);
}

#[tokio::test]
async fn test_add_visits_rejects_bad_date() {
    let app = setup_app(setup_test_db().await);

    let request = json_request(
        "POST",
        "/api/visits",
        json!({ "date": "yesterday", "plates": ["11저8604"] }),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_delete_visit_is_idempotent() {
    let app = setup_app(setup_test_db().await);
    add_visits(&app, "2024-01-01", &["11저8604"]).await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/roster?date=2024-01-01"))
        .await
        .unwrap();
    let roster = extract_json(response.into_body()).await;
    let id = roster["entries"][0]["id"].as_i64().unwrap();

    let uri = format!("/api/visits/{}", id);
    let response = app
        .clone()
        .oneshot(test_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["deleted"], true);
    assert_eq!(body["visit"]["plate"], "11저 8604");

    let response = app.oneshot(test_request("DELETE", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["deleted"], false);
    assert!(body["visit"].is_null());
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn test_plate_stats_lookup() {
    let app = setup_app(setup_test_db().await);
    add_visits(&app, "2024-01-01", &["11저8604"]).await;
    add_visits(&app, "2024-01-03", &["11저8604"]).await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/plates/stats?plate=11%EC%A0%808604"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["plate"], "11저 8604");
    assert_eq!(body["total_count"], 2);
    assert_eq!(body["first_date"], "2024-01-01");
    assert_eq!(body["last_date"], "2024-01-03");

    let response = app
        .oneshot(test_request("GET", "/api/plates/stats?plate=bad-plate"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overview_includes_search() {
    let app = setup_app(setup_test_db().await);
    add_visits(&app, "2024-01-01", &["11저8604", "145마9820"]).await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/overview?view_date=2024-01-01&q=nope"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["view_date"], "2024-01-01");
    assert_eq!(body["day_count"], 2);
    assert_eq!(body["all_plates"].as_array().unwrap().len(), 2);
    assert_eq!(body["search"]["valid"], false);
    assert!(body["search"]["stats"].is_null());
}

#[tokio::test]
async fn test_history_groups_by_date() {
    let app = setup_app(setup_test_db().await);
    add_visits(&app, "2024-01-02", &["11저8604"]).await;
    add_visits(&app, "2024-01-01", &["145마9820", "11저8604"]).await;

    let response = app
        .oneshot(test_request("GET", "/api/history"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["2024-01-01"], json!(["145마 9820", "11저 8604"]));
    assert_eq!(body["2024-01-02"], json!(["11저 8604"]));
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_export_day_headers() {
    let app = setup_app(setup_test_db().await);
    add_visits(&app, "2024-01-01", &["11저8604"]).await;

    let response = app
        .oneshot(test_request("GET", "/api/export?scope=day&date=2024-01-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"2024-01-01.xlsx\""
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn test_export_rejects_unknown_scope() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/export?scope=week"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(test_request("GET", "/api/export?scope=day&date=01-01-2024"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_all_uses_today_filename() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(test_request("GET", "/api/export?scope=all"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let expected = format!(
        "attachment; filename=\"{}.xlsx\"",
        parking_common::time::today()
    );
    assert_eq!(response.headers()[header::CONTENT_DISPOSITION], expected.as_str());
}
