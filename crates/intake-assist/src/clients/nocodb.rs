use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde_json::json;
use tracing::info;

use super::{build_http_client, error_detail};
use crate::config::{NocoDbAuthMethod, NocoDbConfig, RecordLookup};
use crate::workflows::intake::{CollaboratorError, SessionSummary, SummaryStore};

/// NocoDB-backed summary store.
///
/// Upserts by updating the existing row first and creating one when the
/// update is answered with 400, 404 or 409.
pub struct NocoDbStore {
    client: reqwest::Client,
    api_url: Option<String>,
    api_key: Option<String>,
    table_name: String,
    auth_method: NocoDbAuthMethod,
    record_lookup: RecordLookup,
}

impl NocoDbStore {
    pub fn new(config: &NocoDbConfig) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: build_http_client(config.timeout)?,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            table_name: config.table_name.clone(),
            auth_method: config.auth_method,
            record_lookup: config.record_lookup,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_url.is_some() && self.api_key.is_some()
    }

    fn table_url(&self) -> Result<Url, CollaboratorError> {
        let api_url = self
            .api_url
            .as_deref()
            .ok_or(CollaboratorError::NotConfigured("NOCODB_API_URL"))?;
        let raw = format!(
            "{}/api/v1/db/data/noco/{}",
            api_url.trim_end_matches('/'),
            self.table_name
        );
        Url::parse(&raw)
            .map_err(|err| CollaboratorError::Transport(format!("invalid NocoDB url: {err}")))
    }

    fn record_url(&self, session_id: &str) -> Result<Url, CollaboratorError> {
        let mut url = self.table_url()?;
        match self.record_lookup {
            RecordLookup::Path => {
                url.path_segments_mut()
                    .map_err(|_| {
                        CollaboratorError::Transport("NocoDB url cannot take a path".to_string())
                    })?
                    .push(session_id);
            }
            RecordLookup::Where => {
                url.query_pairs_mut()
                    .append_pair("where", &format!("(session_id,eq,{session_id})"));
            }
        }
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder, CollaboratorError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CollaboratorError::NotConfigured("NOCODB_API_KEY"))?;
        Ok(match self.auth_method {
            NocoDbAuthMethod::XcToken => builder.header("xc-token", api_key),
            NocoDbAuthMethod::Bearer => builder.bearer_auth(api_key),
        })
    }
}

#[async_trait]
impl SummaryStore for NocoDbStore {
    async fn upsert(&self, summary: &SessionSummary) -> Result<(), CollaboratorError> {
        let payload = json!({
            "session_id": summary.session_id,
            "summary": summary.summary,
            "updated_at": summary.updated_at_label(),
        });

        let update = self.authorize(self.client.patch(self.record_url(&summary.session_id)?))?;
        let mut response = update.json(&payload).send().await?;

        if matches!(
            response.status(),
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::CONFLICT
        ) {
            info!(session_id = %summary.session_id, "no existing summary row, creating one");
            let create = self.authorize(self.client.post(self.table_url()?))?;
            response = create.json(&payload).send().await?;
        }

        if !response.status().is_success() {
            return Err(error_detail(response).await);
        }
        Ok(())
    }
}
