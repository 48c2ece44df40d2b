//! Writes run records to the store after each mutation.

use std::sync::Arc;

use tracing::debug;

use super::state::RunState;
use crate::error::Result;
use crate::store::RunRecordStore;

/// Publishes snapshots of one run, in order.
///
/// `publish` completes the store round trip before returning, so the driver
/// never starts the next mutation while an earlier write is outstanding.
pub struct ProgressPublisher {
    store: Arc<dyn RunRecordStore>,
    published: usize,
}

impl ProgressPublisher {
    pub fn new(store: Arc<dyn RunRecordStore>) -> Self {
        Self {
            store,
            published: 0,
        }
    }

    pub async fn publish(&mut self, state: &RunState) -> Result<()> {
        self.store.upsert_run(state).await?;
        self.published += 1;
        debug!(
            run_id = %state.run_id,
            status = %state.status,
            steps = state.steps.len(),
            seq = self.published,
            "run state published"
        );
        Ok(())
    }

    /// Number of successful publishes so far.
    pub fn published(&self) -> usize {
        self.published
    }
}
