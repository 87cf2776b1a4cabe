use super::common::*;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::workflows::intake::domain::{ModerationCategories, ModerationResult};
use crate::workflows::intake::router::score_intake_handler;
use crate::workflows::intake::IntakeAssistService;

#[tokio::test]
async fn score_handler_returns_score_and_decision() {
    let h = default_harness();

    let response = score_intake_handler(
        State(h.service.clone()),
        Bytes::from_static(
            br#"{"session_id": "s-1", "fields": {"symptoms": "overwhelmed", "duration": "weeks", "triggers": "work"}}"#,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body, json!({ "status": "ok", "score": 7, "enough_data": true }));
}

#[tokio::test]
async fn score_route_rejects_array_fields() {
    let h = default_harness();

    let response = post_json(
        h.service.clone(),
        "/api/v1/score-intake",
        r#"{"session_id": "s-1", "fields": ["symptoms"]}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Invalid input: 'fields' must be an object.");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request_on_every_route() {
    for path in [
        "/api/v1/extract-fields",
        "/api/v1/score-intake",
        "/api/v1/check-risk",
        "/api/v1/switch-mode",
        "/api/v1/save-summary",
    ] {
        let h = default_harness();
        let response = post_json(h.service.clone(), path, "{\"message\": ").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
        let body = read_json_body(response).await;
        assert_eq!(body["message"], "Invalid JSON in request body.", "{path}");
    }
}

#[tokio::test]
async fn check_risk_route_returns_flag() {
    let h = harness(
        ScriptedLlm::unavailable(),
        StaticModeration::returning(flagged(ModerationCategories {
            violence: true,
            ..ModerationCategories::default()
        })),
    );

    let response = post_json(
        h.service.clone(),
        "/api/v1/check-risk",
        r#"{"session_id": "s-2", "message": "I want to hit someone"}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body, json!({ "status": "ok", "flag": "violence" }));
}

#[tokio::test]
async fn check_risk_route_returns_null_when_unflagged() {
    let h = harness(
        ScriptedLlm::unavailable(),
        StaticModeration::returning(ModerationResult {
            flagged: false,
            categories: ModerationCategories {
                self_harm: true,
                ..ModerationCategories::default()
            },
        }),
    );

    let response = post_json(
        h.service.clone(),
        "/api/v1/check-risk",
        r#"{"message": "rough day"}"#,
    )
    .await;

    let body = read_json_body(response).await;
    assert_eq!(body["flag"], Value::Null);
}

#[tokio::test]
async fn check_risk_route_rejects_blank_message() {
    let h = default_harness();

    let response = post_json(
        h.service.clone(),
        "/api/v1/check-risk",
        r#"{"message": "    "}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(h.moderation.inputs().is_empty());
}

#[tokio::test]
async fn moderation_failure_is_an_opaque_server_error() {
    let h = harness(ScriptedLlm::unavailable(), StaticModeration::unavailable());

    let response = post_json(
        h.service.clone(),
        "/api/v1/check-risk",
        r#"{"message": "hello"}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "error");
    let message = body["message"].as_str().expect("message string");
    assert!(!message.contains("moderation offline"));
}

#[tokio::test]
async fn extract_route_returns_all_seven_keys() {
    let h = harness(
        ScriptedLlm::replying(r#"{"symptoms": "anxious"}"#),
        StaticModeration::unavailable(),
    );

    let response = post_json(
        h.service.clone(),
        "/api/v1/extract-fields",
        r#"{"session_id": "s-1", "message": "I feel anxious"}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let fields = body["fields"].as_object().expect("fields object");
    assert_eq!(fields.len(), 7);
    assert_eq!(fields["symptoms"], "anxious");
    assert_eq!(fields["coping_mechanisms"], Value::Null);
}

#[tokio::test]
async fn extract_route_reports_llm_failure_as_server_error() {
    let h = harness(ScriptedLlm::unavailable(), StaticModeration::unavailable());

    let response = post_json(
        h.service.clone(),
        "/api/v1/extract-fields",
        r#"{"message": "I feel anxious"}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn extract_route_requires_message() {
    let h = default_harness();

    let response = post_json(
        h.service.clone(),
        "/api/v1/extract-fields",
        r#"{"session_id": "s-1"}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(h.llm.requests().is_empty());
}

#[tokio::test]
async fn switch_mode_route_returns_new_mode() {
    let h = harness(ScriptedLlm::replying("reflection"), StaticModeration::unavailable());

    let response = post_json(
        h.service.clone(),
        "/api/v1/switch-mode",
        r#"{"session_id": "s-3", "context": "I keep thinking about what my therapist said."}"#,
    )
    .await;

    let body = read_json_body(response).await;
    assert_eq!(body, json!({ "status": "ok", "new_mode": "reflection" }));
}

#[tokio::test]
async fn save_summary_route_persists_truncated_text() {
    let h = default_harness();
    let payload = json!({
        "session_id": "s-4",
        "summary": "c".repeat(2001),
    });

    let response = post_json(
        h.service.clone(),
        "/api/v1/save-summary",
        &payload.to_string(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await, json!({ "status": "ok" }));
    let stored = h.store.get("s-4").expect("summary stored");
    assert_eq!(stored.summary.len(), 2000);
}

#[tokio::test]
async fn save_summary_route_maps_store_failure_to_server_error() {
    let service = Arc::new(IntakeAssistService::new(
        Arc::new(ScriptedLlm::unavailable()),
        Arc::new(StaticModeration::unavailable()),
        Arc::new(UnavailableStore),
    ));

    let response = post_json(
        service,
        "/api/v1/save-summary",
        r#"{"session_id": "s-6", "summary": "Discussed sleep hygiene."}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert_eq!(body["message"], "Failed to save session summary.");
}

#[tokio::test]
async fn score_route_accepts_empty_session_id() {
    let h = default_harness();

    let response = post_json(
        h.service.clone(),
        "/api/v1/score-intake",
        r#"{"session_id": "", "fields": {"symptoms": "x"}}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body, json!({ "status": "ok", "score": 3, "enough_data": false }));
}

#[tokio::test]
async fn switch_mode_route_reports_llm_failure_as_server_error() {
    let h = harness(ScriptedLlm::unavailable(), StaticModeration::unavailable());

    let response = post_json(
        h.service.clone(),
        "/api/v1/switch-mode",
        r#"{"session_id": "s-5", "context": "I think I am ready for some advice."}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Internal server error occurred.");
    assert_eq!(h.llm.requests().len(), 1);
}
