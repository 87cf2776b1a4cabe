use async_trait::async_trait;

use super::domain::{ModerationResult, SessionSummary};

/// A single system + user exchange sent to a chat model.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system_prompt: &'static str,
    pub user_content: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Chat completion boundary used for field extraction and mode selection.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, CollaboratorError>;
}

/// Content moderation boundary used by the risk check.
#[async_trait]
pub trait ModerationProvider: Send + Sync {
    async fn moderate(&self, input: &str) -> Result<ModerationResult, CollaboratorError>;
}

/// Insert-or-overwrite storage for session summaries, keyed by session id.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn upsert(&self, summary: &SessionSummary) -> Result<(), CollaboratorError>;
}

/// Failure of an outbound call. Details are for server-side logs only.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("upstream returned HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for CollaboratorError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::MalformedResponse(value.to_string())
        } else if let Some(status) = value.status() {
            Self::Status {
                status: status.as_u16(),
                detail: value.to_string(),
            }
        } else {
            Self::Transport(value.to_string())
        }
    }
}
