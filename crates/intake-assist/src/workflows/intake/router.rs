use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::{json, Map, Value};

use super::collaborators::{ChatCompletion, ModerationProvider, SummaryStore};
use super::requests::{
    parse_body, CheckRiskRequest, ExtractFieldsRequest, SaveSummaryRequest, ScoreIntakeRequest,
    SwitchModeRequest, ValidationError,
};
use super::service::{IntakeAssistService, IntakeServiceError};

/// Router builder exposing the five intake endpoints.
pub fn intake_router<L, M, S>(service: Arc<IntakeAssistService<L, M, S>>) -> Router
where
    L: ChatCompletion + 'static,
    M: ModerationProvider + 'static,
    S: SummaryStore + 'static,
{
    Router::new()
        .route("/api/v1/extract-fields", post(extract_fields_handler::<L, M, S>))
        .route("/api/v1/score-intake", post(score_intake_handler::<L, M, S>))
        .route("/api/v1/check-risk", post(check_risk_handler::<L, M, S>))
        .route("/api/v1/switch-mode", post(switch_mode_handler::<L, M, S>))
        .route("/api/v1/save-summary", post(save_summary_handler::<L, M, S>))
        .with_state(service)
}

type SharedService<L, M, S> = State<Arc<IntakeAssistService<L, M, S>>>;

fn decode<T>(
    body: &Bytes,
    build: impl FnOnce(&Map<String, Value>) -> Result<T, ValidationError>,
) -> Result<T, IntakeServiceError> {
    let map = parse_body(body)?;
    Ok(build(&map)?)
}

fn ok_response(mut payload: Value) -> Response {
    if let Value::Object(map) = &mut payload {
        map.insert("status".to_string(), json!("ok"));
    }
    (StatusCode::OK, axum::Json(payload)).into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let payload = json!({
        "status": "error",
        "message": message,
    });
    (status, axum::Json(payload)).into_response()
}

/// Validation errors echo their message; collaborator detail stays server-side.
fn failure_response(error: IntakeServiceError, generic_message: &str) -> Response {
    match error {
        IntakeServiceError::Validation(error) => {
            error_response(StatusCode::BAD_REQUEST, &error.to_string())
        }
        IntakeServiceError::Collaborator(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, generic_message)
        }
    }
}

pub(crate) async fn extract_fields_handler<L, M, S>(
    State(service): SharedService<L, M, S>,
    body: Bytes,
) -> Response
where
    L: ChatCompletion + 'static,
    M: ModerationProvider + 'static,
    S: SummaryStore + 'static,
{
    let result = match decode(&body, ExtractFieldsRequest::from_body) {
        Ok(request) => service.extract_fields(request).await,
        Err(error) => Err(error),
    };

    match result {
        Ok(fields) => ok_response(json!({ "fields": fields })),
        Err(error) => failure_response(error, "Field extraction failed."),
    }
}

pub(crate) async fn score_intake_handler<L, M, S>(
    State(service): SharedService<L, M, S>,
    body: Bytes,
) -> Response
where
    L: ChatCompletion + 'static,
    M: ModerationProvider + 'static,
    S: SummaryStore + 'static,
{
    match decode(&body, ScoreIntakeRequest::from_body) {
        Ok(request) => {
            let outcome = service.score_intake(&request);
            ok_response(json!({
                "score": outcome.score,
                "enough_data": outcome.enough_data,
            }))
        }
        Err(error) => failure_response(error, "Internal server error occurred."),
    }
}

pub(crate) async fn check_risk_handler<L, M, S>(
    State(service): SharedService<L, M, S>,
    body: Bytes,
) -> Response
where
    L: ChatCompletion + 'static,
    M: ModerationProvider + 'static,
    S: SummaryStore + 'static,
{
    let result = match decode(&body, CheckRiskRequest::from_body) {
        Ok(request) => service.check_risk(request).await,
        Err(error) => Err(error),
    };

    match result {
        Ok(flag) => ok_response(json!({ "flag": flag })),
        Err(error) => failure_response(error, "Moderation API failed or invalid input."),
    }
}

pub(crate) async fn switch_mode_handler<L, M, S>(
    State(service): SharedService<L, M, S>,
    body: Bytes,
) -> Response
where
    L: ChatCompletion + 'static,
    M: ModerationProvider + 'static,
    S: SummaryStore + 'static,
{
    let result = match decode(&body, SwitchModeRequest::from_body) {
        Ok(request) => service.switch_mode(request).await,
        Err(error) => Err(error),
    };

    match result {
        Ok(mode) => ok_response(json!({ "new_mode": mode })),
        Err(error) => failure_response(error, "Internal server error occurred."),
    }
}

pub(crate) async fn save_summary_handler<L, M, S>(
    State(service): SharedService<L, M, S>,
    body: Bytes,
) -> Response
where
    L: ChatCompletion + 'static,
    M: ModerationProvider + 'static,
    S: SummaryStore + 'static,
{
    let result = match decode(&body, SaveSummaryRequest::from_body) {
        Ok(request) => service.save_summary(request).await,
        Err(error) => Err(error),
    };

    match result {
        Ok(_) => ok_response(json!({})),
        Err(error) => failure_response(error, "Failed to save session summary."),
    }
}
