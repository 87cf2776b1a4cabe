use serde_json::Value;

use super::collaborators::{ChatRequest, CollaboratorError};
use super::domain::{truncate_chars, ExtractedFields, IntakeField, MAX_CONTEXT_CHARS};

pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are a data extractor for a mental health assistant. Based on the user's message, extract the following fields in this order and with these exact names: symptoms, duration, triggers, intensity, frequency, impact_on_life, coping_mechanisms. If a field is not clearly mentioned, return null. Output the result as a flat JSON object. Do not guess, infer, or fabricate.

Examples:
User: "I've been feeling overwhelmed for a few weeks. It gets worse at work."
Output: {"symptoms": "overwhelmed", "duration": "a few weeks", "triggers": "work", "intensity": null, "frequency": null, "impact_on_life": null, "coping_mechanisms": null}

User: "Hello, how are you today?"
Output: {"symptoms": null, "duration": null, "triggers": null, "intensity": null, "frequency": null, "impact_on_life": null, "coping_mechanisms": null}"#;

pub const MODE_SYSTEM_PROMPT: &str = "You are a conversation controller for a mental health assistant. Based on the user's last message, decide whether the assistant should continue asking intake questions, switch to advice-giving, enter reflective discussion, or summarize and close. Only return the most appropriate chat mode: intake, advice, reflection, or summary.";

pub fn extraction_request(message: &str) -> ChatRequest {
    ChatRequest {
        system_prompt: EXTRACTION_SYSTEM_PROMPT,
        user_content: message.to_string(),
        temperature: 0.3,
        max_tokens: 500,
    }
}

pub fn mode_request(context: &str) -> ChatRequest {
    ChatRequest {
        system_prompt: MODE_SYSTEM_PROMPT,
        user_content: truncate_chars(context, MAX_CONTEXT_CHARS).to_string(),
        temperature: 0.1,
        max_tokens: 10,
    }
}

/// Reads the model's JSON reply, keeping only the seven known fields.
pub fn parse_extraction_reply(reply: &str) -> Result<ExtractedFields, CollaboratorError> {
    let payload = strip_code_fence(reply);
    let value: Value = serde_json::from_str(payload)
        .map_err(|err| CollaboratorError::MalformedResponse(format!("extraction reply: {err}")))?;
    let object = value.as_object().ok_or_else(|| {
        CollaboratorError::MalformedResponse("extraction reply is not a JSON object".to_string())
    })?;

    let mut fields = ExtractedFields::default();
    for field in IntakeField::ALL {
        *fields.slot_mut(field) = object
            .get(field.key())
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
    }
    Ok(fields)
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_suffix("```").unwrap_or(body);
    // Drop an info string such as `json` on the opening fence line.
    match body.split_once('\n') {
        Some((info, rest)) if !info.trim_start().starts_with('{') => rest.trim(),
        _ => body.trim(),
    }
}
