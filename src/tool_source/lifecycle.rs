//! Scoped ownership of a run's tool-source session.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{ToolSourceConnector, ToolSourceSession};
use crate::error::{Result, RunError};
use crate::types::ToolSource;

/// Exclusive owner of a run's tool-source session.
///
/// The session is closed exactly once: by [`ToolSourceLease::release`] on the
/// normal path, or from `Drop` when the lease is dropped while still open
/// (panic unwinding, aborted task). A lease may hold no session at all.
pub struct ToolSourceLease {
    session: Option<Arc<dyn ToolSourceSession>>,
}

impl ToolSourceLease {
    /// A lease with nothing to close.
    pub fn empty() -> Self {
        Self { session: None }
    }

    /// Open a session against `source`.
    ///
    /// Connector failures surface as [`RunError::ToolSource`] so callers can
    /// treat them as acquisition failures.
    pub async fn acquire(
        connector: &dyn ToolSourceConnector,
        source: &ToolSource,
    ) -> Result<Self> {
        let session = connector.open(source).await.map_err(|err| match err {
            RunError::ToolSource { .. } => err,
            other => RunError::tool_source(&source.id, other.to_string()),
        })?;
        debug!(tool_source_id = %source.id, "tool source session opened");
        Ok(Self {
            session: Some(session),
        })
    }

    /// Handle passed to the completion service.
    pub fn session(&self) -> Option<Arc<dyn ToolSourceSession>> {
        self.session.clone()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Close the session, if any. Close failures are logged, not returned.
    pub async fn release(mut self) {
        if let Some(session) = self.session.take() {
            close_session(session).await;
        }
    }
}

impl Drop for ToolSourceLease {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(close_session(session));
            }
            Err(_) => warn!(
                tool_source_id = %session.source_id(),
                "tool source lease dropped outside a runtime; session not closed"
            ),
        }
    }
}

impl fmt::Debug for ToolSourceLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSourceLease")
            .field(
                "session",
                &self.session.as_ref().map(|s| s.source_id().to_string()),
            )
            .finish()
    }
}

async fn close_session(session: Arc<dyn ToolSourceSession>) {
    let source_id = session.source_id().to_string();
    match session.close().await {
        Ok(()) => debug!(tool_source_id = %source_id, "tool source session closed"),
        Err(err) => warn!(
            tool_source_id = %source_id,
            error = %err,
            "failed to close tool source session"
        ),
    }
}
