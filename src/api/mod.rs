//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        // Card timers, one per mounted task
        .route("/tasks", get(list_cards_handler))
        .route(
            "/tasks/:task_id/timer",
            post(mount_card_handler)
                .get(get_card_handler)
                .delete(unmount_card_handler),
        )
        .route("/tasks/:task_id/timer/:action", post(card_action_handler))
        // Focus timer, saves on stop
        .route("/focus", get(get_focus_handler))
        .route("/focus/select", post(select_focus_handler))
        .route("/focus/:action", post(focus_action_handler))
        // Reports, passed through from the backend
        .route("/reports/daily", get(daily_report_handler))
        .route("/reports/statistics", get(statistics_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
