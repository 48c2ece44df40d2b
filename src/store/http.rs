//! Run-record store reached over HTTP.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::RunRecordStore;
use crate::config::EngineConfig;
use crate::error::{Result, RunError};
use crate::run::RunState;
use crate::types::{AgentDefinition, ToolSource};

/// REST client for the run-record store.
///
/// - `PUT  {base}/v1/agent-runs/{runId}`
/// - `GET  {base}/v1/projects/{projectId}/agents/{agentId}`
/// - `GET  {base}/v1/projects/{projectId}/tool-sources/{toolSourceId}`
#[derive(Debug, Clone)]
pub struct HttpRunStore {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpRunStore {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
        }
    }

    /// Build from config; requires `store_url`.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let base_url = config.store_url.clone().ok_or_else(|| {
            RunError::Configuration("store_url is required for the HTTP run store".into())
        })?;
        let mut store = Self::new(config.http_client()?, base_url);
        store.api_token = config.api_token.clone();
        Ok(store)
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.api_token {
            if let Ok(val) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, val);
            }
        }
        headers
    }

    /// `base_url` with each segment appended and percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            RunError::Configuration(format!("invalid store_url '{}': {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                RunError::Configuration(format!("store_url '{}' cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON resource; `None` on 404.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        let resp = self.client.get(url).headers(self.headers()).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = ensure_success(resp).await?;
        Ok(Some(resp.json::<T>().await?))
    }
}

async fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(RunError::api(status.as_u16(), body))
}

#[async_trait]
impl RunRecordStore for HttpRunStore {
    async fn upsert_run(&self, state: &RunState) -> Result<()> {
        let url = self.endpoint(&["v1", "agent-runs", state.run_id.as_str()])?;
        let resp = self
            .client
            .put(url)
            .headers(self.headers())
            .json(state)
            .send()
            .await?;
        ensure_success(resp).await?;
        debug!(run_id = %state.run_id, status = %state.status, "run record written");
        Ok(())
    }

    async fn get_agent(&self, project_id: &str, agent_id: &str) -> Result<AgentDefinition> {
        let url = self.endpoint(&["v1", "projects", project_id, "agents", agent_id])?;
        self.get_json(url)
            .await?
            .ok_or_else(|| RunError::AgentNotFound(agent_id.to_string()))
    }

    async fn get_tool_source(&self, project_id: &str, tool_source_id: &str) -> Result<ToolSource> {
        let url = self.endpoint(&["v1", "projects", project_id, "tool-sources", tool_source_id])?;
        self.get_json(url)
            .await?
            .ok_or_else(|| RunError::ToolSourceNotFound(tool_source_id.to_string()))
    }
}
