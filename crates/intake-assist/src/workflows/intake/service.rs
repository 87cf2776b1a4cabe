use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use super::collaborators::{ChatCompletion, CollaboratorError, ModerationProvider, SummaryStore};
use super::domain::{ChatMode, ExtractedFields, RiskFlag, SessionSummary, MAX_SUMMARY_CHARS};
use super::prompts::{extraction_request, mode_request, parse_extraction_reply};
use super::requests::{
    CheckRiskRequest, ExtractFieldsRequest, SaveSummaryRequest, ScoreIntakeRequest,
    SwitchModeRequest, ValidationError,
};
use super::risk::RiskClassifier;
use super::scoring::{IntakeScore, IntakeScorer};

/// Service composing the pure scorers with the outbound collaborators.
///
/// Logs carry session identifiers and outcomes only, never user text.
pub struct IntakeAssistService<L, M, S> {
    llm: Arc<L>,
    moderation: Arc<M>,
    store: Arc<S>,
    scorer: IntakeScorer,
    classifier: RiskClassifier,
}

impl<L, M, S> IntakeAssistService<L, M, S>
where
    L: ChatCompletion + 'static,
    M: ModerationProvider + 'static,
    S: SummaryStore + 'static,
{
    pub fn new(llm: Arc<L>, moderation: Arc<M>, store: Arc<S>) -> Self {
        Self::with_classifier(llm, moderation, store, RiskClassifier::standard())
    }

    pub fn with_classifier(
        llm: Arc<L>,
        moderation: Arc<M>,
        store: Arc<S>,
        classifier: RiskClassifier,
    ) -> Self {
        Self {
            llm,
            moderation,
            store,
            scorer: IntakeScorer,
            classifier,
        }
    }

    /// Ask the chat model for the seven intake fields mentioned in a message.
    pub async fn extract_fields(
        &self,
        request: ExtractFieldsRequest,
    ) -> Result<ExtractedFields, IntakeServiceError> {
        let session = request.session_id.as_deref().unwrap_or("-");
        info!(session_id = session, "extracting intake fields");

        let fields = self
            .llm
            .complete(&extraction_request(&request.message))
            .await
            .and_then(|reply| parse_extraction_reply(&reply))
            .map_err(|err| {
                error!(session_id = session, error = %err, "field extraction failed");
                err
            })?;

        Ok(fields)
    }

    pub fn score_intake(&self, request: &ScoreIntakeRequest) -> IntakeScore {
        let outcome = self.scorer.score(&request.fields);
        info!(
            session_id = %request.session_id,
            score = outcome.score,
            enough_data = outcome.enough_data,
            "intake progress evaluated"
        );
        outcome
    }

    /// Moderate a message and reduce the verdict to a single risk flag.
    pub async fn check_risk(
        &self,
        request: CheckRiskRequest,
    ) -> Result<Option<RiskFlag>, IntakeServiceError> {
        let session = request.session_id.as_deref().unwrap_or("-");

        let verdict = self
            .moderation
            .moderate(&request.message)
            .await
            .map_err(|err| {
                error!(session_id = session, error = %err, "moderation call failed");
                err
            })?;

        let flag = self.classifier.classify(&verdict);
        info!(
            session_id = session,
            flag = flag.map(|flag| flag.label()).unwrap_or("none"),
            "risk check completed"
        );
        Ok(flag)
    }

    pub async fn switch_mode(
        &self,
        request: SwitchModeRequest,
    ) -> Result<ChatMode, IntakeServiceError> {
        let reply = self
            .llm
            .complete(&mode_request(&request.context))
            .await
            .map_err(|err| {
                error!(session_id = %request.session_id, error = %err, "mode selection failed");
                err
            })?;

        let mode = ChatMode::from_model_output(&reply);
        info!(session_id = %request.session_id, new_mode = mode.label(), "chat mode selected");
        Ok(mode)
    }

    /// Persist the latest summary for a session, replacing any earlier one.
    pub async fn save_summary(
        &self,
        request: SaveSummaryRequest,
    ) -> Result<SessionSummary, IntakeServiceError> {
        let summary = SessionSummary::new(&request.session_id, &request.summary, Utc::now());
        if request.summary.chars().nth(MAX_SUMMARY_CHARS).is_some() {
            info!(session_id = %summary.session_id, "summary truncated before persistence");
        }

        self.store.upsert(&summary).await.map_err(|err| {
            error!(session_id = %summary.session_id, error = %err, "summary persistence failed");
            err
        })?;

        info!(session_id = %summary.session_id, "session summary saved");
        Ok(summary)
    }
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
