//! OpenAI-compatible chat completion and moderation client.
//!
//! - Chat: `POST {base_url}/chat/completions`, reply in `choices[0].message.content`
//! - Moderation: `POST {base_url}/moderations`, verdict in `results[0]`
//!
//! Both use `Authorization: Bearer {api_key}`. A missing key is reported per
//! call so the service still starts and answers validation errors.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{build_http_client, error_detail};
use crate::config::OpenAiConfig;
use crate::workflows::intake::{
    ChatCompletion, ChatRequest, CollaboratorError, ModerationCategories, ModerationProvider,
    ModerationResult,
};

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    #[serde(default)]
    results: Vec<ModerationEntry>,
}

#[derive(Debug, Deserialize)]
struct ModerationEntry {
    flagged: bool,
    /// Categories the model does not support come back as `null`.
    #[serde(default)]
    categories: HashMap<String, Option<bool>>,
}

pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    moderation_model: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: build_http_client(config.timeout)?,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            moderation_model: config.moderation_model.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, CollaboratorError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CollaboratorError::NotConfigured("OPENAI_API_KEY"))?;

        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_detail(response).await);
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, CollaboratorError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_content },
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let response: ChatCompletionResponse =
            self.post_json("/chat/completions", &body).await?.json().await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| {
                CollaboratorError::MalformedResponse("chat completion had no content".to_string())
            })
    }
}

#[async_trait]
impl ModerationProvider for OpenAiClient {
    async fn moderate(&self, input: &str) -> Result<ModerationResult, CollaboratorError> {
        let mut body = json!({ "input": input });
        if let Some(model) = &self.moderation_model {
            body["model"] = json!(model);
        }

        let response: ModerationResponse =
            self.post_json("/moderations", &body).await?.json().await?;

        // An empty result set is an upstream fault, not an all-clear.
        let entry = response.results.into_iter().next().ok_or_else(|| {
            CollaboratorError::MalformedResponse("moderation returned no results".to_string())
        })?;

        Ok(ModerationResult {
            flagged: entry.flagged,
            categories: ModerationCategories::from_provider_map(
                entry
                    .categories
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.unwrap_or(false))),
            ),
        })
    }
}
