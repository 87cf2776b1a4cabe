//! Outbound HTTP adapters for the intake collaborators.

mod nocodb;
mod openai;

pub use nocodb::NocoDbStore;
pub use openai::OpenAiClient;

use std::time::Duration;

use crate::workflows::intake::CollaboratorError;

/// Build a `reqwest::Client` whose every request is bounded by `timeout`.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, CollaboratorError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(|err| CollaboratorError::Transport(format!("failed to build http client: {err}")))
}

/// Reads a short, single-line excerpt of an error body for server-side logs.
pub(crate) async fn error_detail(response: reqwest::Response) -> CollaboratorError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let detail: String = body.lines().next().unwrap_or_default().chars().take(200).collect();
    CollaboratorError::Status { status, detail }
}
