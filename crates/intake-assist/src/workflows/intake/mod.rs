//! Intake assistant request handling: field extraction, completeness scoring,
//! risk classification, mode selection and summary persistence.
//!
//! The scorer and risk classifier are pure. Everything that leaves the process
//! goes through the traits in [`collaborators`], so the handlers can be
//! exercised against in-memory fakes.

pub mod collaborators;
pub mod domain;
pub mod prompts;
pub mod requests;
pub mod risk;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use collaborators::{
    ChatCompletion, ChatRequest, CollaboratorError, ModerationProvider, SummaryStore,
};
pub use domain::{
    ChatMode, ExtractedFields, IntakeField, IntakeFieldSet, ModerationCategories,
    ModerationResult, RiskFlag, SessionSummary, MAX_CONTEXT_CHARS, MAX_SUMMARY_CHARS,
};
pub use requests::ValidationError;
pub use risk::{RiskClassifier, RiskRule};
pub use router::intake_router;
pub use scoring::{IntakeScore, IntakeScorer, ENOUGH_DATA_THRESHOLD, FIELD_WEIGHTS, MAX_INTAKE_SCORE};
pub use service::{IntakeAssistService, IntakeServiceError};
