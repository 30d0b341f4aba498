//! Endpoint tests for dropdown options and location relationships.

#[path = "capacity_support/mod.rs"]
mod capacity_support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use capacity_support::{call_json, init_app, login};
use rstest::rstest;
use serde_json::json;

#[actix_web::test]
async fn unsaved_years_serve_the_default_options() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;

    let (status, body) = call_json(
        &app,
        TestRequest::get()
            .uri("/api/dropdown-options?fiscalYear=FY_25")
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fiscalYear"], "FY_25");
    assert_eq!(body["types"], json!(["Solar", "Wind", "Hybrid"]));
}

#[actix_web::test]
async fn adding_an_option_twice_is_idempotent() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;
    let cookie = login(&app).await;
    let add = || {
        TestRequest::post()
            .uri("/api/dropdown-option")
            .cookie(cookie.clone())
            .set_json(json!({
                "fiscalYear": "FY_25",
                "optionType": "groups",
                "optionValue": "  Northwind  "
            }))
            .to_request()
    };

    let (status, first) = call_json(&app, add()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["added"], true);
    assert_eq!(first["optionValue"], "Northwind");

    let (status, second) = call_json(&app, add()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["added"], false);

    let (_, options) = call_json(
        &app,
        TestRequest::get()
            .uri("/api/dropdown-options?fiscalYear=FY_25")
            .to_request(),
    )
    .await;
    let groups = options["groups"].as_array().expect("groups");
    assert_eq!(groups.iter().filter(|group| **group == "Northwind").count(), 1);
}

#[rstest]
#[case(json!({"optionType": "groups"}), "Option type and value are required")]
#[case(json!({"optionType": "colours", "optionValue": "red"}), "unknown option type: colours")]
#[actix_web::test]
async fn invalid_option_additions_are_rejected(
    #[case] payload: serde_json::Value,
    #[case] message: &str,
) {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;
    let cookie = login(&app).await;

    let (status, body) = call_json(
        &app,
        TestRequest::post()
            .uri("/api/dropdown-option")
            .cookie(cookie)
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], message);
}

#[actix_web::test]
async fn replaced_relationships_are_served_back() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;
    let cookie = login(&app).await;

    let (status, stored) = call_json(
        &app,
        TestRequest::post()
            .uri("/api/location-relationships?fiscalYear=FY_26")
            .cookie(cookie)
            .set_json(json!([
                {"location": "Khavda", "locationCode": "GJ"},
                {"location": "Bhadla", "locationCode": "RJ"}
            ]))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored.as_array().map(Vec::len), Some(2));

    let (status, body) = call_json(
        &app,
        TestRequest::get()
            .uri("/api/location-relationships?fiscalYear=FY_26")
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, stored);
}

#[actix_web::test]
async fn option_replacement_requires_a_session() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = init_app(dir.path()).await;

    let (status, _) = call_json(
        &app,
        TestRequest::post()
            .uri("/api/dropdown-options")
            .set_json(json!({"fiscalYear": "FY_25", "groups": ["AGEL"]}))
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
