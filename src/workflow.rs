//! Seam towards the external workflow orchestrator.
//!
//! No real engine is integrated (non-goal); the trait marks the boundary a
//! production backend would plug into, with a logging stub as the single
//! implementation.

use crate::error::{Error, Result};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Notification contract towards the business-process orchestrator.
#[async_trait]
pub trait WorkflowService: Send + Sync {
    /// Tells the orchestrator that a document package is ready for filing.
    async fn notify_package_ready(
        &self,
        cancel: &CancellationToken,
        package_id: &str,
    ) -> Result<()>;
}

/// Stub that logs the event instead of calling out.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubWorkflow;

impl StubWorkflow {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WorkflowService for StubWorkflow {
    async fn notify_package_ready(
        &self,
        cancel: &CancellationToken,
        package_id: &str,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        info!(package_id, "workflow: document package ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_acknowledges_unless_cancelled() {
        let workflow = StubWorkflow::new();
        let cancel = CancellationToken::new();

        workflow
            .notify_package_ready(&cancel, "pkg-1")
            .await
            .unwrap();

        cancel.cancel();
        let err = workflow
            .notify_package_ready(&cancel, "pkg-1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
