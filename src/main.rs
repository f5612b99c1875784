//! Task Timer - per-task stopwatches over HTTP
//!
//! This is the main entry point for the task-timer server.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use task_timer::{
    api::create_router,
    config::Config,
    services::BackendClient,
    state::AppState,
    tasks::task_sync_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("task_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting task-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, backend={}, card_variant={:?}",
        config.host, config.port, config.backend_url, config.card_variant
    );

    let client = BackendClient::new(&config.backend_url, config.token.clone(), config.request_timeout())?;

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.card_variant.into(),
        Arc::new(client.clone()),
    )
    .with_backend(client.clone()));

    // Keep cards in line with the backend's assigned tasks
    if let Some(period) = config.sync_period() {
        let sync_state = Arc::clone(&state);
        tokio::spawn(async move {
            task_sync_task(sync_state, client, period).await;
        });
    }

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /status                       - Board overview");
    info!("  GET    /tasks                        - List card timers");
    info!("  POST   /tasks/:task_id/timer         - Mount a card timer");
    info!("  DELETE /tasks/:task_id/timer         - Unmount a card timer");
    info!("  POST   /tasks/:task_id/timer/:action - start | pause | reset | stop");
    info!("  POST   /focus/select                 - Bind the focus timer to a task");
    info!("  POST   /focus/:action                - start | pause | reset | stop");
    info!("  GET    /reports/daily                - Daily report from the backend");
    info!("  GET    /reports/statistics           - Statistics from the backend");
    info!("  GET    /health                       - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.board.shutdown();
    info!("Server shutdown complete");
    Ok(())
}
