//! Persistence collaborator for finished timing sessions

use async_trait::async_trait;

use crate::state::TaskId;

/// Durable sink for completed timing sessions.
///
/// A timer treats a call as an opaque asynchronous operation with two
/// outcomes: recorded, or failed with a reason.
#[async_trait]
pub trait TimeEntryStore: Send + Sync {
    /// Record `duration_seconds` of work against `task_id`
    async fn record(&self, task_id: &TaskId, duration_seconds: u64) -> anyhow::Result<()>;
}
