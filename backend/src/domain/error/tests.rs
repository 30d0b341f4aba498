//! Tests for domain error construction and serialisation.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("who"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("no"), ErrorCode::Forbidden)]
#[case(Error::not_found("gone"), ErrorCode::NotFound)]
#[case(Error::conflict("taken"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::not_implemented("proxy"), ErrorCode::NotImplemented)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn blank_messages_fall_back_to_generic_text() {
    let error = Error::invalid_request("   ");
    assert_eq!(error.message(), "unspecified error");
}

#[rstest]
fn trace_id_is_absent_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn trace_id_is_captured_in_scope() {
    let trace_id = TraceId::generate();
    let error = TraceId::scope(trace_id, async { Error::not_found("missing") }).await;
    assert_eq!(error.trace_id(), Some(trace_id.to_string().as_str()));
}

#[rstest]
fn serialises_camel_case_and_skips_empty_fields() {
    let value = serde_json::to_value(Error::conflict("taken")).expect("serialise error");
    assert_eq!(
        value,
        json!({ "error": "taken", "code": "conflict", "message": "taken" })
    );
}

#[rstest]
fn error_key_mirrors_the_fallback_message() {
    let value = serde_json::to_value(Error::not_found("  ")).expect("serialise error");
    assert_eq!(value["error"], json!("unspecified error"));
    assert_eq!(value["error"], value["message"]);
}

#[rstest]
fn deserialises_bodies_that_only_carry_error() {
    let error: Error = serde_json::from_value(json!({
        "code": "not_found",
        "error": "Backup not found",
    }))
    .expect("deserialise error");
    assert_eq!(error.message(), "Backup not found");
    assert_eq!(
        serde_json::to_value(&error).expect("serialise error")["error"],
        json!("Backup not found")
    );
}

#[rstest]
fn serialises_trace_id_and_details() {
    let error = Error::invalid_request("bad")
        .with_trace_id("abc")
        .with_details(json!({ "row": 2 }));
    let value = serde_json::to_value(error).expect("serialise error");
    assert_eq!(value.get("traceId"), Some(&json!("abc")));
    assert_eq!(value.get("details"), Some(&json!({ "row": 2 })));
}

#[rstest]
fn deserialises_snake_case_trace_alias() {
    let error: Error = serde_json::from_value(json!({
        "code": "not_implemented",
        "message": "proxy",
        "trace_id": "xyz"
    }))
    .expect("deserialise error");
    assert_eq!(error.code(), ErrorCode::NotImplemented);
    assert_eq!(error.trace_id(), Some("xyz"));
}
