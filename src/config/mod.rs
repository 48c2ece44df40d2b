//! Configuration system (layered: code > env > config file).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RunError};

/// Default timeout for store and completion HTTP requests.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;

const ENV_PUBLIC_URL: &str = "AGENT_RUNS_PUBLIC_URL";
const ENV_COMPLETION_URL: &str = "AGENT_RUNS_COMPLETION_URL";
const ENV_STORE_URL: &str = "AGENT_RUNS_STORE_URL";
const ENV_REQUEST_TIMEOUT_MS: &str = "AGENT_RUNS_REQUEST_TIMEOUT_MS";
const ENV_API_TOKEN: &str = "AGENT_RUNS_API_TOKEN";

/// Engine configuration.
///
/// Passed explicitly into every component that needs it. In particular the
/// engine's own `public_url` is never looked up from process-wide state; the
/// tool-source session endpoint is derived from it.
///
/// Resolution order for each field:
/// 1. Values set in code (builder)
/// 2. `AGENT_RUNS_*` environment variables (and `.env`)
/// 3. The TOML config file
#[derive(Debug, Clone, Serialize, Deserialize, Builder, PartialEq)]
pub struct EngineConfig {
    /// Base URL under which this engine is reachable.
    #[builder(into)]
    pub public_url: String,
    /// Base URL of the completion service.
    #[builder(into)]
    pub completion_url: Option<String>,
    /// Base URL of the run-record store.
    #[builder(into)]
    pub store_url: Option<String>,
    #[builder(default = DEFAULT_REQUEST_TIMEOUT_MS)]
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Bearer token sent to the store and completion service.
    #[builder(into)]
    pub api_token: Option<String>,
}

/// On-disk shape; every field optional so env can fill the gaps.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    public_url: Option<String>,
    completion_url: Option<String>,
    store_url: Option<String>,
    request_timeout_ms: Option<u64>,
    api_token: Option<String>,
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl EngineConfig {
    /// Load config from the default file location (if present) and the environment.
    pub fn load() -> Result<Self> {
        let path = Self::default_path().filter(|p| p.exists());
        Self::load_from(path.as_deref())
    }

    /// Load config from an explicit file (if any) and the environment.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let file = match path {
            Some(path) => read_config_file(path)?,
            None => ConfigFile::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Parse a TOML document, without consulting the environment.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| RunError::Configuration(format!("invalid config file: {e}")))?;
        Self::resolve(file, |_| None)
    }

    /// Default config file: `<config dir>/agent-runs/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "agent-runs")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn resolve(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let public_url = non_empty(ENV_PUBLIC_URL)
            .or(file.public_url)
            .ok_or_else(|| {
                RunError::Configuration(format!("missing public_url (set {ENV_PUBLIC_URL})"))
            })?;
        let request_timeout_ms = match non_empty(ENV_REQUEST_TIMEOUT_MS) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                RunError::Configuration(format!("{ENV_REQUEST_TIMEOUT_MS} must be an integer"))
            })?,
            None => file
                .request_timeout_ms
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        };

        let config = Self {
            public_url,
            completion_url: non_empty(ENV_COMPLETION_URL).or(file.completion_url),
            store_url: non_empty(ENV_STORE_URL).or(file.store_url),
            request_timeout_ms,
            api_token: non_empty(ENV_API_TOKEN).or(file.api_token),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that URLs are usable.
    pub fn validate(&self) -> Result<()> {
        check_http_url("public_url", &self.public_url)?;
        if let Some(url) = &self.completion_url {
            check_http_url("completion_url", url)?;
        }
        if let Some(url) = &self.store_url {
            check_http_url("store_url", url)?;
        }
        Ok(())
    }

    /// Endpoint of the MCP session serving a tool source.
    pub fn tool_source_url(&self, tool_source_id: &str) -> String {
        format!(
            "{}/v1/mcp/{}",
            self.public_url.trim_end_matches('/'),
            tool_source_id
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Build an HTTP client honoring the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(self.request_timeout())
            .pool_max_idle_per_host(10)
            .build()?)
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let raw = fs::read_to_string(path)?;
    toml::from_str(&raw).map_err(|e| {
        RunError::Configuration(format!("invalid config file {}: {e}", path.display()))
    })
}

fn check_http_url(field: &str, url: &str) -> Result<()> {
    let trimmed = url.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Ok(());
    }
    Err(RunError::Configuration(format!(
        "{field} must be an http(s) URL; got '{url}'"
    )))
}
