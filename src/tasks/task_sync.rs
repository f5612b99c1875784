//! Assigned-task synchronisation background task

use std::{sync::Arc, time::Duration};

use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::{
    services::BackendClient,
    state::{AppState, ReconcileSummary},
};

/// Fetch the assigned tasks once and reconcile the board with them
pub async fn sync_assigned_tasks(
    state: &AppState,
    client: &BackendClient,
) -> anyhow::Result<ReconcileSummary> {
    let tasks = client.assigned_tasks().await?;
    let summary = state.board.reconcile(&tasks);

    if !summary.mounted.is_empty() || !summary.unmounted.is_empty() {
        info!(
            "Task sync: {} assigned, mounted {:?}, unmounted {:?}",
            tasks.len(),
            summary.mounted,
            summary.unmounted
        );
    }
    Ok(summary)
}

/// Background task that keeps the board's cards in line with the backend
pub async fn task_sync_task(state: Arc<AppState>, client: BackendClient, period: Duration) {
    info!("Starting task sync every {}s against {}", period.as_secs(), client.base_url());

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        if let Err(e) = sync_assigned_tasks(&state, &client).await {
            warn!("Task sync failed, retrying next period: {:#}", e);
        }
    }
}
