use intake_assist::clients::{NocoDbStore, OpenAiClient};
use intake_assist::config::AppConfig;
use intake_assist::workflows::intake::{CollaboratorError, IntakeAssistService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type LiveIntakeService = IntakeAssistService<OpenAiClient, OpenAiClient, NocoDbStore>;

/// Wires the live collaborators. Missing credentials are warned about here and
/// reported per request as server errors.
pub(crate) fn build_intake_service(
    config: &AppConfig,
) -> Result<Arc<LiveIntakeService>, CollaboratorError> {
    let openai = Arc::new(OpenAiClient::new(&config.openai)?);
    if !openai.is_configured() {
        warn!("OPENAI_API_KEY not set; extraction, risk and mode endpoints will fail");
    }

    let store = Arc::new(NocoDbStore::new(&config.persistence)?);
    if !store.is_configured() {
        warn!("NOCODB_API_URL or NOCODB_API_KEY not set; summaries cannot be saved");
    }

    Ok(Arc::new(IntakeAssistService::new(
        openai.clone(),
        openai,
        store,
    )))
}
