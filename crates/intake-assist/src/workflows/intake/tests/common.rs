use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;
use tower::ServiceExt;

use crate::workflows::intake::collaborators::{
    ChatCompletion, ChatRequest, CollaboratorError, ModerationProvider, SummaryStore,
};
use crate::workflows::intake::domain::{
    IntakeField, IntakeFieldSet, ModerationCategories, ModerationResult, SessionSummary,
};
use crate::workflows::intake::{intake_router, IntakeAssistService};

/// Chat model fake that answers every request with the same reply.
#[derive(Default)]
pub(super) struct ScriptedLlm {
    reply: Option<String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedLlm {
    pub(super) fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn unavailable() -> Self {
        Self::default()
    }

    pub(super) fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("llm mutex poisoned").clone()
    }
}

#[async_trait]
impl ChatCompletion for ScriptedLlm {
    async fn complete(&self, request: &ChatRequest) -> Result<String, CollaboratorError> {
        self.requests
            .lock()
            .expect("llm mutex poisoned")
            .push(request.clone());
        self.reply
            .clone()
            .ok_or_else(|| CollaboratorError::Transport("connection refused".to_string()))
    }
}

/// Moderation fake returning a fixed verdict and recording inputs.
#[derive(Default)]
pub(super) struct StaticModeration {
    verdict: Option<ModerationResult>,
    inputs: Mutex<Vec<String>>,
}

impl StaticModeration {
    pub(super) fn returning(verdict: ModerationResult) -> Self {
        Self {
            verdict: Some(verdict),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn unavailable() -> Self {
        Self::default()
    }

    pub(super) fn inputs(&self) -> Vec<String> {
        self.inputs.lock().expect("moderation mutex poisoned").clone()
    }
}

#[async_trait]
impl ModerationProvider for StaticModeration {
    async fn moderate(&self, input: &str) -> Result<ModerationResult, CollaboratorError> {
        self.inputs
            .lock()
            .expect("moderation mutex poisoned")
            .push(input.to_string());
        self.verdict.ok_or_else(|| CollaboratorError::Status {
            status: 503,
            detail: "moderation offline".to_string(),
        })
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    rows: Mutex<HashMap<String, SessionSummary>>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub(super) fn get(&self, session_id: &str) -> Option<SessionSummary> {
        self.rows
            .lock()
            .expect("store mutex poisoned")
            .get(session_id)
            .cloned()
    }

    pub(super) fn row_count(&self) -> usize {
        self.rows.lock().expect("store mutex poisoned").len()
    }

    pub(super) fn writes(&self) -> usize {
        *self.writes.lock().expect("store mutex poisoned")
    }
}

#[async_trait]
impl SummaryStore for MemoryStore {
    async fn upsert(&self, summary: &SessionSummary) -> Result<(), CollaboratorError> {
        self.rows
            .lock()
            .expect("store mutex poisoned")
            .insert(summary.session_id.clone(), summary.clone());
        *self.writes.lock().expect("store mutex poisoned") += 1;
        Ok(())
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl SummaryStore for UnavailableStore {
    async fn upsert(&self, _summary: &SessionSummary) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::Transport("database offline".to_string()))
    }
}

pub(super) type TestService = IntakeAssistService<ScriptedLlm, StaticModeration, MemoryStore>;

pub(super) struct Harness {
    pub(super) llm: Arc<ScriptedLlm>,
    pub(super) moderation: Arc<StaticModeration>,
    pub(super) store: Arc<MemoryStore>,
    pub(super) service: Arc<TestService>,
}

pub(super) fn harness(llm: ScriptedLlm, moderation: StaticModeration) -> Harness {
    let llm = Arc::new(llm);
    let moderation = Arc::new(moderation);
    let store = Arc::new(MemoryStore::default());
    let service = Arc::new(IntakeAssistService::new(
        llm.clone(),
        moderation.clone(),
        store.clone(),
    ));
    Harness {
        llm,
        moderation,
        store,
        service,
    }
}

pub(super) fn default_harness() -> Harness {
    harness(
        ScriptedLlm::replying("advice"),
        StaticModeration::returning(ModerationResult::default()),
    )
}

pub(super) fn flagged(categories: ModerationCategories) -> ModerationResult {
    ModerationResult {
        flagged: true,
        categories,
    }
}

pub(super) fn fields(entries: &[(IntakeField, &str)]) -> IntakeFieldSet {
    entries
        .iter()
        .fold(IntakeFieldSet::new(), |set, (field, value)| {
            set.with(*field, *value)
        })
}

pub(super) async fn post_json<L, M, S>(
    service: Arc<IntakeAssistService<L, M, S>>,
    path: &str,
    body: &str,
) -> Response
where
    L: ChatCompletion + 'static,
    M: ModerationProvider + 'static,
    S: SummaryStore + 'static,
{
    intake_router(service)
        .oneshot(
            Request::post(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("router responds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
