//! Run driver: consumes the completion stream and keeps the ledger and the
//! run record in step with it.

use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;

use super::detector::{self, Completion};
use super::prompt;
use super::publisher::ProgressPublisher;
use super::state::RunState;
use crate::completion::{CompletionEvent, CompletionRequest, CompletionService, StreamFault};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::store::RunRecordStore;
use crate::tool_source::ToolSourceSession;
use crate::tools::{ResolvedTools, ToolClassifier};
use crate::types::{AgentDefinition, ToolCallBlock};

/// What one stream event did to the run.
#[derive(Debug, PartialEq)]
enum Applied {
    /// Text was buffered; nothing to publish yet.
    Buffered,
    /// The ledger changed.
    Mutated,
    /// The stream reported a fault; the run is now terminal.
    Faulted,
}

/// Drives one run from its first publish to its terminal publish.
pub struct RunDriver {
    config: EngineConfig,
    completion: Arc<dyn CompletionService>,
    store: Arc<dyn RunRecordStore>,
}

impl RunDriver {
    pub fn new(
        config: EngineConfig,
        completion: Arc<dyn CompletionService>,
        store: Arc<dyn RunRecordStore>,
    ) -> Self {
        Self {
            config,
            completion,
            store,
        }
    }

    /// Run `agent` on `user_prompt` until the stream ends or faults.
    ///
    /// Returns the terminal record, which has already been published. Invariant
    /// violations are published as a failed record and then returned as
    /// errors. Store failures propagate as they happen.
    pub async fn run(
        &self,
        run_id: &str,
        agent: &AgentDefinition,
        tools: &ResolvedTools,
        session: Option<Arc<dyn ToolSourceSession>>,
        user_prompt: &str,
    ) -> Result<RunState> {
        let mut state = RunState::start(run_id, agent);
        let mut publisher = ProgressPublisher::new(self.store.clone());

        tracing::info!(
            run_id = %state.run_id,
            agent_id = %agent.id,
            tools = tools.tools.len(),
            max_steps = agent.max_steps,
            "agent run started"
        );
        publisher.publish(&state).await?;

        let request = CompletionRequest {
            system_prompt: prompt::system_prompt(agent, Utc::now().date_naive()),
            user_prompt: user_prompt.to_string(),
            tools: tools.tools.definitions().to_vec(),
            step_ceiling: agent.max_steps,
            tool_source_url: session
                .as_ref()
                .map(|s| self.config.tool_source_url(s.source_id())),
            session,
        };

        let mut stream = match self.completion.stream(request).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!(run_id = %state.run_id, error = %err, "completion stream failed to open");
                let message = StreamFault::from_open_error(&err).run_message(&state.steps.markdown_text());
                state.fail(message)?;
                publisher.publish(&state).await?;
                log_terminal(&state, &publisher);
                return Ok(state);
            }
        };

        let mut consumer = EventConsumer::new(&tools.classifier);
        while let Some(event) = stream.next().await {
            match consumer.apply(&mut state, event) {
                Ok(Applied::Buffered) => {}
                Ok(Applied::Mutated) => publisher.publish(&state).await?,
                Ok(Applied::Faulted) => {
                    publisher.publish(&state).await?;
                    log_terminal(&state, &publisher);
                    return Ok(state);
                }
                Err(err) if err.is_invariant_violation() => {
                    tracing::error!(
                        run_id = %state.run_id,
                        error = %err,
                        "event stream and ledger diverged"
                    );
                    state.fail(err.to_string())?;
                    publisher.publish(&state).await?;
                    return Err(err);
                }
                Err(err) => return Err(err),
            }
        }

        consumer.flush(&mut state);
        let completion = detector::finalize(&mut state)?;
        if completion == Completion::Incomplete {
            tracing::debug!(run_id = %state.run_id, "stream ended without a completion call");
        }
        publisher.publish(&state).await?;
        log_terminal(&state, &publisher);
        Ok(state)
    }
}

fn log_terminal(state: &RunState, publisher: &ProgressPublisher) {
    tracing::info!(
        run_id = %state.run_id,
        status = %state.status,
        steps = state.steps.len(),
        publishes = publisher.published(),
        "agent run finished"
    );
}

/// Per-run event state: the classifier and the pending text buffer.
struct EventConsumer<'a> {
    classifier: &'a ToolClassifier,
    pending: String,
}

impl<'a> EventConsumer<'a> {
    fn new(classifier: &'a ToolClassifier) -> Self {
        Self {
            classifier,
            pending: String::new(),
        }
    }

    fn apply(&mut self, state: &mut RunState, event: CompletionEvent) -> Result<Applied> {
        match event {
            CompletionEvent::TextDelta { text } => {
                self.pending.push_str(&text);
                Ok(Applied::Buffered)
            }
            CompletionEvent::ToolCall {
                call_id,
                tool_name,
                input,
            } => {
                let origin = self.classifier.classify(&tool_name)?;
                self.flush(state);
                state
                    .steps
                    .begin_tool_call(ToolCallBlock::started(call_id, tool_name, origin, input))?;
                Ok(Applied::Mutated)
            }
            CompletionEvent::ToolResult { call_id, output } => {
                state.steps.resolve_tool_call(&call_id, output)?;
                Ok(Applied::Mutated)
            }
            CompletionEvent::Error { cause } => {
                tracing::warn!(run_id = %state.run_id, cause = ?cause, "completion stream reported an error");
                let message = cause.run_message(&state.steps.markdown_text());
                state.fail(message)?;
                Ok(Applied::Faulted)
            }
        }
    }

    /// Move buffered text into the ledger as one markdown block.
    fn flush(&mut self, state: &mut RunState) {
        let text = std::mem::take(&mut self.pending);
        if !text.is_empty() {
            state.steps.push_markdown(text);
        }
    }
}
