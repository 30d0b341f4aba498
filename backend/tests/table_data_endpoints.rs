//! Endpoint tests for table data and backups over the in-memory backend.

#[path = "capacity_support/mod.rs"]
mod capacity_support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use capacity_support::{call_json, init_app, login, record};
use rstest::rstest;
use serde_json::{Value, json};

fn save_request(cookie: &actix_web::cookie::Cookie<'static>, rows: Value) -> TestRequest {
    TestRequest::post()
        .uri("/api/table-data")
        .cookie(cookie.clone())
        .set_json(json!({"fiscalYear": "FY_25", "data": rows}))
}

#[actix_web::test]
async fn saved_records_are_served_back() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;
    let cookie = login(&app).await;

    let (status, saved) = call_json(
        &app,
        save_request(&cookie, json!([record(1, "Solar", "Khavda")])).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["message"], "Data saved successfully");
    assert_eq!(saved["version"], 1);

    let (status, body) = call_json(
        &app,
        TestRequest::get()
            .uri("/api/table-data?fiscalYear=FY_25")
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fiscalYear"], "FY_25");
    assert_eq!(body["data"][0]["location"], "Khavda");
    assert_eq!(body["data"][0]["wind"], Value::Null);
}

#[actix_web::test]
async fn hybrid_rows_drop_their_solar_component() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;
    let cookie = login(&app).await;

    let (status, saved) = call_json(
        &app,
        save_request(&cookie, json!([record(1, "Hybrid", "Baap")])).to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["data"][0]["solar"], Value::Null);
    assert_eq!(saved["data"][0]["wind"], 20.0);
}

#[rstest]
#[case("&type=hybrid", 1)]
#[case("&type=SOLAR", 1)]
#[case("&type=", 3)]
#[case("&type=&location=", 3)]
#[actix_web::test]
async fn summary_type_filters_ignore_case_and_blanks(#[case] filter: &str, #[case] rows: u64) {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;
    let cookie = login(&app).await;
    let rows_to_save = json!([
        record(1, "Solar", "Khavda"),
        record(2, "Hybrid", "Baap"),
        record(3, "Wind", "Dayapar"),
    ]);
    call_json(&app, save_request(&cookie, rows_to_save).to_request()).await;

    let (status, body) = call_json(
        &app,
        TestRequest::get()
            .uri(&format!("/api/table-data/summary?fiscalYear=FY_25{filter}"))
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rowCount"], rows);
}

#[actix_web::test]
async fn unsaved_fiscal_years_read_as_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;

    let (status, body) = call_json(
        &app,
        TestRequest::get()
            .uri("/api/table-data?fiscalYear=FY_30")
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["version"], Value::Null);
}

#[rstest]
#[case("/api/table-data")]
#[case("/api/table-data?fiscalYear=")]
#[actix_web::test]
async fn reads_require_a_fiscal_year(#[case] uri: &str) {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;

    let (status, body) = call_json(&app, TestRequest::get().uri(uri).to_request()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["error"], "fiscalYear is required");
}

#[actix_web::test]
async fn malformed_json_bodies_use_the_error_envelope() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;
    let cookie = login(&app).await;

    let req = TestRequest::post()
        .uri("/api/table-data")
        .cookie(cookie)
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let (status, body) = call_json(&app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert!(body["message"].is_string());
}

#[actix_web::test]
async fn non_array_data_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;
    let cookie = login(&app).await;

    let (status, body) = call_json(
        &app,
        save_request(&cookie, json!({"rows": []})).to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Data must be an array");
}

#[rstest]
#[case(TestRequest::post().uri("/api/table-data").set_json(json!({"fiscalYear": "FY_25", "data": []})))]
#[case(TestRequest::delete().uri("/api/table-data?fiscalYear=FY_25"))]
#[case(TestRequest::post().uri("/api/backup-data/restore").set_json(json!({"fiscalYear": "FY_25", "version": 1})))]
#[case(TestRequest::delete().uri("/api/backup-data?fiscalYear=FY_25&version=1"))]
#[actix_web::test]
async fn mutations_require_a_session(#[case] req: TestRequest) {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;

    let (status, body) = call_json(&app, req.to_request()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn delete_archives_the_active_records() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;
    let cookie = login(&app).await;
    call_json(
        &app,
        save_request(&cookie, json!([record(1, "Solar", "Khavda")])).to_request(),
    )
    .await;

    let delete = || {
        TestRequest::delete()
            .uri("/api/table-data?fiscalYear=FY_25")
            .cookie(cookie.clone())
            .to_request()
    };
    let (status, body) = call_json(&app, delete()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Table data marked as deleted successfully");

    let (status, body) = call_json(&app, delete()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Table data already marked as deleted");

    let (_, table) = call_json(
        &app,
        TestRequest::get()
            .uri("/api/table-data?fiscalYear=FY_25")
            .to_request(),
    )
    .await;
    assert_eq!(table["data"], json!([]));
}

#[actix_web::test]
async fn deleting_a_never_saved_year_is_not_found() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;
    let cookie = login(&app).await;

    let (status, body) = call_json(
        &app,
        TestRequest::delete()
            .uri("/api/table-data?fiscalYear=FY_40")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["error"], body["message"]);
}

#[actix_web::test]
async fn each_save_archives_the_previous_version() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;
    let cookie = login(&app).await;
    for location in ["Khavda", "Baap", "Bhadla"] {
        call_json(
            &app,
            save_request(&cookie, json!([record(1, "Solar", location)])).to_request(),
        )
        .await;
    }

    let (status, body) = call_json(
        &app,
        TestRequest::get()
            .uri("/api/backup-data?fiscalYear=FY_25")
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let backups = body["backups"].as_array().expect("backups array");
    let archived = backups
        .iter()
        .filter(|backup| backup["isDeleted"] == true)
        .count();
    assert_eq!(backups.len(), 3);
    assert_eq!(archived, 2);
}

#[actix_web::test]
async fn restoring_a_backup_reactivates_its_records() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;
    let cookie = login(&app).await;
    for location in ["Khavda", "Baap"] {
        call_json(
            &app,
            save_request(&cookie, json!([record(1, "Solar", location)])).to_request(),
        )
        .await;
    }

    let (status, restored) = call_json(
        &app,
        TestRequest::post()
            .uri("/api/backup-data/restore")
            .cookie(cookie.clone())
            .set_json(json!({"fiscalYear": "FY_25", "version": 1}))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restored["restoredFrom"], 1);
    assert_eq!(restored["version"], 3);

    let (_, table) = call_json(
        &app,
        TestRequest::get()
            .uri("/api/table-data?fiscalYear=FY_25")
            .to_request(),
    )
    .await;
    assert_eq!(table["data"][0]["location"], "Khavda");
    assert_eq!(table["version"], 3);
}

#[actix_web::test]
async fn restoring_the_active_version_bumps_it() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;
    let cookie = login(&app).await;
    for location in ["Khavda", "Baap"] {
        call_json(
            &app,
            save_request(&cookie, json!([record(1, "Solar", location)])).to_request(),
        )
        .await;
    }

    let (status, restored) = call_json(
        &app,
        TestRequest::post()
            .uri("/api/backup-data/restore")
            .cookie(cookie.clone())
            .set_json(json!({"fiscalYear": "FY_25", "version": 2}))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restored["version"], 3);

    let (_, backups) = call_json(
        &app,
        TestRequest::get()
            .uri("/api/backup-data?fiscalYear=FY_25")
            .to_request(),
    )
    .await;
    let backups = backups["backups"].as_array().expect("backups array");
    let active: Vec<_> = backups
        .iter()
        .filter(|backup| backup["isDeleted"] == false)
        .collect();
    assert_eq!(backups.len(), 3);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["version"], 3);
    assert_eq!(active[0]["data"][0]["location"], "Baap");
}

#[actix_web::test]
async fn only_archived_versions_can_be_purged() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;
    let cookie = login(&app).await;
    for location in ["Khavda", "Baap"] {
        call_json(
            &app,
            save_request(&cookie, json!([record(1, "Solar", location)])).to_request(),
        )
        .await;
    }
    let purge = |version: i32| {
        TestRequest::delete()
            .uri(&format!("/api/backup-data?fiscalYear=FY_25&version={version}"))
            .cookie(cookie.clone())
            .to_request()
    };

    let (status, _) = call_json(&app, purge(2)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call_json(&app, purge(1)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Backup deleted successfully");
}
