//! Tests for configuration loading.

use std::io::Write;
use std::sync::{Mutex, OnceLock};

use agent_runs::config::{EngineConfig, DEFAULT_REQUEST_TIMEOUT_MS};
use agent_runs::error::RunError;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 5] = [
    "AGENT_RUNS_PUBLIC_URL",
    "AGENT_RUNS_COMPLETION_URL",
    "AGENT_RUNS_STORE_URL",
    "AGENT_RUNS_REQUEST_TIMEOUT_MS",
    "AGENT_RUNS_API_TOKEN",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clear_config_env() -> EnvGuard {
    let guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
    guard
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn load_from_reads_toml_file() {
    let _lock = env_lock_guard();
    let _env = clear_config_env();
    let file = write_config(
        r#"
public_url = "https://engine.example.com"
store_url = "https://store.example.com"
request_timeout_ms = 5000
"#,
    );

    let config = EngineConfig::load_from(Some(file.path())).unwrap();

    assert_eq!(config.public_url, "https://engine.example.com");
    assert_eq!(config.store_url.as_deref(), Some("https://store.example.com"));
    assert_eq!(config.completion_url, None);
    assert_eq!(config.request_timeout_ms, 5000);
}

#[test]
fn env_overrides_file() {
    let _lock = env_lock_guard();
    let _env = clear_config_env();
    let file = write_config(r#"public_url = "https://file.example.com""#);
    std::env::set_var("AGENT_RUNS_PUBLIC_URL", "https://env.example.com");
    std::env::set_var("AGENT_RUNS_API_TOKEN", "token-1");

    let config = EngineConfig::load_from(Some(file.path())).unwrap();

    assert_eq!(config.public_url, "https://env.example.com");
    assert_eq!(config.api_token.as_deref(), Some("token-1"));
    assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
}

#[test]
fn malformed_file_is_a_configuration_error() {
    let _lock = env_lock_guard();
    let _env = clear_config_env();
    let file = write_config("public_url = [");

    let err = EngineConfig::load_from(Some(file.path())).unwrap_err();
    assert!(matches!(err, RunError::Configuration(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let _lock = env_lock_guard();
    let _env = clear_config_env();
    let dir = tempfile::tempdir().unwrap();

    let err = EngineConfig::load_from(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, RunError::Io(_)));
}

#[test]
fn from_toml_str_ignores_environment() {
    let _lock = env_lock_guard();
    let _env = clear_config_env();
    std::env::set_var("AGENT_RUNS_PUBLIC_URL", "https://env.example.com");

    let config = EngineConfig::from_toml_str(r#"public_url = "https://file.example.com""#).unwrap();
    assert_eq!(config.public_url, "https://file.example.com");
}
