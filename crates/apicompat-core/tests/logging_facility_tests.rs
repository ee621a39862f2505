#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use apicompat_core::errors::{ApiError, ApiErrorKind};
use apicompat_core::logging_facility::test_capture::init_test_capture;
use apicompat_core::{
    check_api_lint, check_compatibility, check_signature_compatibility, ClassifierConfig,
    CompatibilityMode,
};
use apicompat_core::{log_op_end, log_op_error, log_op_start};
use apicompat_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_CLASS_COUNT, FIELD_DIFF_COUNT,
    FIELD_DURATION_MS, FIELD_ERROR_COUNT, FIELD_ERR_CODE, FIELD_ERR_KIND, FIELD_MODE,
    FIELD_RUN_ID, FIELD_WARNING_COUNT,
};
use common::{in_package, snapshot};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, mode = "released");

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[0].field(FIELD_MODE), Some("released"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();
    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].field(FIELD_DURATION_MS), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ApiError::new(ApiErrorKind::UnknownIssue).with_message("Unknown issue id: --hide Foo");
    log_op_error!(op_name, err, duration_ms = 10);

    let error_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();
    assert_eq!(error_events.len(), 1);
    assert_eq!(error_events[0].level, tracing::Level::ERROR);
    assert_eq!(error_events[0].field(FIELD_ERR_CODE), Some("ERR_UNKNOWN_ISSUE"));
    assert_eq!(error_events[0].field(FIELD_ERR_KIND), Some("UnknownIssue"));
}

// S1: a compatibility run brackets its work with start and end events
#[test]
fn test_check_compatibility_emits_lifecycle_events() {
    let capture = init_test_capture();
    let old = snapshot(&in_package(
        "  public class Logged {\n    method public void gone();\n  }\n",
    ));
    let new = snapshot(&in_package("  public class Logged {\n  }\n"));
    let config = ClassifierConfig::builder()
        .mode(CompatibilityMode::Released)
        .build();

    check_compatibility(&old, &new, &config).unwrap();

    capture.assert_event_exists("check_compatibility", EVENT_START);
    capture.assert_event_exists("check_compatibility", EVENT_END);
    let ends: Vec<_> = capture
        .events_for_op("check_compatibility")
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();
    let end = ends.last().unwrap();
    assert_eq!(end.field(FIELD_DIFF_COUNT), Some("1"));
    assert_eq!(end.field(FIELD_ERROR_COUNT), Some("1"));
    assert_eq!(end.field(FIELD_WARNING_COUNT), Some("0"));
    assert!(end.field(FIELD_DURATION_MS).is_some());

    let run_id = end.field(FIELD_RUN_ID).unwrap();
    let start_count = capture.count_events(|e| {
        e.op.as_deref() == Some("check_compatibility")
            && e.event.as_deref() == Some(EVENT_START)
            && e.field(FIELD_RUN_ID) == Some(run_id)
    });
    assert_eq!(start_count, 1);
}

// S2: a parse failure ends with an error event and no end event
#[test]
fn test_signature_parse_failure_emits_end_error() {
    let capture = init_test_capture();

    let result = check_signature_compatibility(
        "broken.txt",
        "// Signature format: 7.0\n",
        "current.txt",
        "// Signature format: 2.0\n",
        &ClassifierConfig::default(),
    );
    assert!(result.is_err());

    let events = capture.events_for_op("check_signature_compatibility");
    let errors: Vec<_> = events
        .iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();
    assert!(!errors.is_empty());
    assert_eq!(errors[0].field(FIELD_ERR_CODE), Some("ERR_INVALID_SIGNATURE"));
    assert!(!events
        .iter()
        .any(|e| e.event.as_deref() == Some(EVENT_END)));
}

#[test]
fn test_check_api_lint_emits_lifecycle_events() {
    let capture = init_test_capture();
    let new = snapshot("package android.pkg {\n  public class HTMLWriter {\n  }\n}\n");

    check_api_lint(&new, None, &ClassifierConfig::default()).unwrap();

    capture.assert_event_exists("check_api_lint", EVENT_START);
    capture.assert_event_exists("check_api_lint", EVENT_END);
    let starts: Vec<_> = capture
        .events_for_op("check_api_lint")
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_START))
        .collect();
    assert_eq!(starts.last().unwrap().field(FIELD_CLASS_COUNT), Some("1"));
}
