//! Boundary validation for the JSON request bodies.
//!
//! Bodies are parsed into a `serde_json::Value` first so that type mismatches
//! (a numeric `message`, an array for `fields`) can be reported precisely
//! instead of through a generic deserialization failure.

use serde_json::{Map, Value};

use super::domain::IntakeFieldSet;

/// Input problems reported to the caller as HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid JSON in request body.")]
    InvalidJson,
    #[error("Request body must be a JSON object.")]
    NotAnObject,
    #[error("Missing required field: '{0}'.")]
    MissingField(&'static str),
    #[error("Invalid input: '{field}' must be {expected}.")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("Field '{0}' cannot be empty.")]
    EmptyField(&'static str),
}

pub fn parse_body(bytes: &[u8]) -> Result<Map<String, Value>, ValidationError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|_| ValidationError::InvalidJson)?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::NotAnObject),
    }
}

/// Present, non-null string. Emptiness is left to the caller.
fn string_field(body: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    match body.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(ValidationError::InvalidType {
            field,
            expected: "a string",
        }),
    }
}

/// Rejects only the empty string; whitespace counts as content.
fn non_empty_text(body: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    let text = string_field(body, field)?;
    if text.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(text)
}

fn non_blank_text(body: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    let text = string_field(body, field)?;
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(text)
}

/// Optional identifiers are only used for logging, so a non-string is dropped.
fn optional_session_id(body: &Map<String, Value>) -> Option<String> {
    body.get("session_id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractFieldsRequest {
    pub session_id: Option<String>,
    pub message: String,
}

impl ExtractFieldsRequest {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        Ok(Self {
            message: non_empty_text(body, "message")?,
            session_id: optional_session_id(body),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreIntakeRequest {
    pub session_id: String,
    pub fields: IntakeFieldSet,
}

impl ScoreIntakeRequest {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        // Any string identifies the session here, including an empty one.
        let session_id = string_field(body, "session_id")?.trim().to_string();
        let fields = match body.get("fields") {
            None | Some(Value::Null) => return Err(ValidationError::MissingField("fields")),
            Some(Value::Object(map)) => IntakeFieldSet::from_json_map(map),
            Some(_) => {
                return Err(ValidationError::InvalidType {
                    field: "fields",
                    expected: "an object",
                })
            }
        };

        Ok(Self { session_id, fields })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckRiskRequest {
    pub session_id: Option<String>,
    /// Trimmed message text; never logged.
    pub message: String,
}

impl CheckRiskRequest {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        Ok(Self {
            message: non_blank_text(body, "message")?.trim().to_string(),
            session_id: optional_session_id(body),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchModeRequest {
    pub session_id: String,
    pub context: String,
}

impl SwitchModeRequest {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        Ok(Self {
            session_id: non_empty_text(body, "session_id")?.trim().to_string(),
            context: non_empty_text(body, "context")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveSummaryRequest {
    pub session_id: String,
    pub summary: String,
}

impl SaveSummaryRequest {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        Ok(Self {
            session_id: non_blank_text(body, "session_id")?,
            summary: non_blank_text(body, "summary")?,
        })
    }
}
