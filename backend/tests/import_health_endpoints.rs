//! Endpoint tests for fixture import and the API health check.

#[path = "capacity_support/mod.rs"]
mod capacity_support;

use std::path::PathBuf;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use capacity_support::{call_json, init_app, login};
use serde_json::json;

fn bundled_fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

#[actix_web::test]
async fn bundled_fixtures_import_as_records() {
    let app = init_app(&bundled_fixtures()).await;
    let cookie = login(&app).await;

    let (status, body) = call_json(
        &app,
        TestRequest::post()
            .uri("/api/import-data")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["fiscalYear"], "FY_25");
    assert_eq!(body["results"][0]["count"], 3);

    let (_, table) = call_json(
        &app,
        TestRequest::get()
            .uri("/api/table-data?fiscalYear=FY_25")
            .to_request(),
    )
    .await;
    let rows = table["data"].as_array().expect("rows");
    assert_eq!(rows.len(), 3);
    let hybrid = rows
        .iter()
        .find(|row| row["type"] == "Hybrid")
        .expect("hybrid row");
    assert_eq!(hybrid["capacity"], 300.0);
    assert_eq!(hybrid["solar"], serde_json::Value::Null);
    assert_eq!(hybrid["pss"], "PSS - 4");
}

#[actix_web::test]
async fn import_requires_a_session() {
    let app = init_app(&bundled_fixtures()).await;

    let (status, _) = call_json(
        &app,
        TestRequest::post().uri("/api/import-data").to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn missing_fixture_directories_are_not_found() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(&dir.path().join("absent")).await;
    let cookie = login(&app).await;

    let (status, _) = call_json(
        &app,
        TestRequest::post()
            .uri("/api/import-data")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn health_reports_the_storage_backend() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;

    let (status, body) = call_json(&app, TestRequest::get().uri("/api/health").to_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], json!({"backend": "memory", "detail": "connected"}));
}
