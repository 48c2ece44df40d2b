//! The durable record of one run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ledger::StepLedger;
use crate::error::{Result, RunError};
use crate::types::{AgentDefinition, RunId, RunStatus};

/// Run record written to the store after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub run_id: RunId,
    pub agent_id: String,
    pub project_id: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    #[serde(default)]
    pub steps: StepLedger,
}

impl RunState {
    /// A fresh in-progress record with an empty ledger.
    pub fn start(run_id: impl Into<RunId>, agent: &AgentDefinition) -> Self {
        Self {
            run_id: run_id.into(),
            agent_id: agent.id.clone(),
            project_id: agent.project_id.clone(),
            status: RunStatus::InProgress,
            started_at: Utc::now(),
            finished_at: None,
            message: String::new(),
            output: None,
            steps: StepLedger::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn complete(&mut self, output: serde_json::Value, message: impl Into<String>) -> Result<()> {
        self.finish(RunStatus::Completed, message.into())?;
        self.output = Some(output);
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        self.finish(RunStatus::Failed, message.into())
    }

    fn finish(&mut self, status: RunStatus, message: String) -> Result<()> {
        if self.is_terminal() {
            return Err(RunError::InvalidState(format!(
                "run {} is already {}, cannot become {status}",
                self.run_id, self.status
            )));
        }
        self.status = status;
        self.message = message;
        self.finished_at = Some(Utc::now());
        Ok(())
    }
}
