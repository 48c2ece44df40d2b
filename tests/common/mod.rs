//! Shared test helpers: scripted completion service, recording tool-source
//! connector and fixtures.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;

use agent_runs::completion::{CompletionEvent, CompletionRequest, CompletionService, CompletionStream};
use agent_runs::config::EngineConfig;
use agent_runs::error::{Result, RunError};
use agent_runs::run::{AgentRunExecutor, RunState};
use agent_runs::store::{InMemoryRunStore, RunRecordStore};
use agent_runs::tool_source::{RemoteTool, ToolSourceConnector, ToolSourceSession};
use agent_runs::types::*;

pub const PROJECT_ID: &str = "proj-1";
pub const AGENT_ID: &str = "agent-1";
pub const TOOL_SOURCE_ID: &str = "ts-1";

pub fn config() -> EngineConfig {
    EngineConfig::builder()
        .public_url("https://engine.example.com")
        .build()
}

pub fn agent(max_steps: u32, output_mode: OutputMode) -> AgentDefinition {
    AgentDefinition::builder()
        .id(AGENT_ID)
        .project_id(PROJECT_ID)
        .system_prompt("Help the customer.")
        .max_steps(max_steps)
        .output_mode(output_mode)
        .tool_source_id(TOOL_SOURCE_ID)
        .build()
}

pub fn empty_source() -> ToolSource {
    ToolSource::new(TOOL_SOURCE_ID, Vec::new())
}

/// A catalog with one piece tool, `send_email`.
pub fn email_source() -> ToolSource {
    ToolSource::new(
        TOOL_SOURCE_ID,
        vec![ToolSourceEntry::piece(
            "send_email",
            PieceToolMetadata {
                piece_name: "@pieces/gmail".into(),
                piece_version: "0.4.1".into(),
                action_name: "send_email".into(),
                display_name: Some("Send email".into()),
            },
        )],
    )
}

pub fn remote_tool(name: &str) -> RemoteTool {
    RemoteTool {
        name: name.to_string(),
        description: format!("remote {name}"),
        input_schema: serde_json::json!({ "type": "object", "properties": {} }),
    }
}

/// Completion service that replays a fixed event script.
pub struct ScriptedCompletion {
    events: Vec<CompletionEvent>,
    open_error: Mutex<Option<RunError>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new(events: Vec<CompletionEvent>) -> Self {
        Self {
            events,
            open_error: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Refuse to open the stream with `err`.
    pub fn failing(err: RunError) -> Self {
        Self {
            events: Vec::new(),
            open_error: Mutex::new(Some(err)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn stream(&self, request: CompletionRequest) -> Result<CompletionStream> {
        self.requests.lock().unwrap().push(request);
        if let Some(err) = self.open_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(futures::stream::iter(self.events.clone()).boxed())
    }
}

#[derive(Default)]
pub struct SessionCounters {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub lists: AtomicUsize,
}

impl SessionCounters {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }
}

/// Connector whose sessions count opens, lists and closes.
pub struct RecordingConnector {
    pub counters: Arc<SessionCounters>,
    tools: Vec<RemoteTool>,
    fail_open: bool,
    fail_list: bool,
}

impl RecordingConnector {
    pub fn new(tools: Vec<RemoteTool>) -> Self {
        Self {
            counters: Arc::new(SessionCounters::default()),
            tools,
            fail_open: false,
            fail_list: false,
        }
    }

    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn failing_list() -> Self {
        Self {
            fail_list: true,
            ..Self::new(Vec::new())
        }
    }
}

#[async_trait]
impl ToolSourceConnector for RecordingConnector {
    async fn open(&self, source: &ToolSource) -> Result<Arc<dyn ToolSourceSession>> {
        if self.fail_open {
            return Err(RunError::tool_source(&source.id, "connection refused"));
        }
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(RecordingSession {
            source_id: source.id.clone(),
            counters: self.counters.clone(),
            tools: self.tools.clone(),
            fail_list: self.fail_list,
        }))
    }
}

struct RecordingSession {
    source_id: String,
    counters: Arc<SessionCounters>,
    tools: Vec<RemoteTool>,
    fail_list: bool,
}

#[async_trait]
impl ToolSourceSession for RecordingSession {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn list_tools(&self) -> Result<Vec<RemoteTool>> {
        self.counters.lists.fetch_add(1, Ordering::SeqCst);
        if self.fail_list {
            return Err(RunError::tool_source(&self.source_id, "list failed"));
        }
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, _arguments: serde_json::Value) -> Result<serde_json::Value> {
        Ok(serde_json::json!({ "called": name }))
    }

    async fn close(&self) -> Result<()> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Store that serves fixtures but rejects every run-record write.
pub struct RejectingStore {
    pub inner: InMemoryRunStore,
}

#[async_trait]
impl RunRecordStore for RejectingStore {
    async fn upsert_run(&self, _state: &RunState) -> Result<()> {
        Err(RunError::Store("store unavailable".into()))
    }

    async fn get_agent(&self, project_id: &str, agent_id: &str) -> Result<AgentDefinition> {
        self.inner.get_agent(project_id, agent_id).await
    }

    async fn get_tool_source(&self, project_id: &str, tool_source_id: &str) -> Result<ToolSource> {
        self.inner.get_tool_source(project_id, tool_source_id).await
    }
}

/// Everything one executor test needs.
pub struct Harness {
    pub store: Arc<InMemoryRunStore>,
    pub completion: Arc<ScriptedCompletion>,
    pub connector: Arc<RecordingConnector>,
    pub executor: AgentRunExecutor,
}

impl Harness {
    pub fn new(
        agent: AgentDefinition,
        source: ToolSource,
        completion: ScriptedCompletion,
        connector: RecordingConnector,
    ) -> Self {
        let store = Arc::new(InMemoryRunStore::new());
        store.insert_agent(agent).unwrap();
        store.insert_tool_source(PROJECT_ID, source).unwrap();
        let completion = Arc::new(completion);
        let connector = Arc::new(connector);
        let executor = AgentRunExecutor::new(
            config(),
            store.clone(),
            completion.clone(),
            connector.clone(),
        );
        Self {
            store,
            completion,
            connector,
            executor,
        }
    }

    pub async fn execute(&self, run_id: &str) -> Result<RunState> {
        self.executor
            .execute(run_id, AGENT_ID, PROJECT_ID, "Where is my order?")
            .await
    }

    pub fn history(&self, run_id: &str) -> Vec<RunState> {
        self.store.history(run_id).unwrap()
    }
}
