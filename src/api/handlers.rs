//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;
use tracing::{info, warn};

use super::responses::{
    ApiError, ApiResponse, CardView, DailyReportQuery, HealthResponse, MountRequest,
    SelectFocusRequest, StatisticsQuery, StatusResponse, TimerAction, TimerView,
};
use crate::{
    services::BackendClient,
    state::{AppState, Card, TaskId},
    timer::{StopOutcome, Timer, Transition},
};

type ActionResult = Result<(StatusCode, Json<ApiResponse>), ApiError>;

fn backend(state: &AppState) -> Result<&BackendClient, ApiError> {
    state
        .backend
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("No backend configured for reports"))
}

fn find_card(state: &AppState, task_id: &TaskId) -> Result<Card, ApiError> {
    state
        .board
        .card(task_id)
        .ok_or_else(|| ApiError::not_found(format!("No timer mounted for task {}", task_id)))
}

fn transition_response(timer: &Timer, action: TimerAction, transition: Transition) -> ActionResult {
    let (status, message) = match transition {
        Transition::Applied => ("applied", format!("Timer {}", action.as_str())),
        Transition::Unchanged => ("unchanged", format!("Timer already in {} state", action.as_str())),
    };
    Ok((StatusCode::OK, Json(ApiResponse::new(status, message, TimerView::from(timer)))))
}

/// Run a control action against a timer and describe the result
async fn apply_action(timer: &Timer, action: TimerAction) -> ActionResult {
    match action {
        TimerAction::Start => transition_response(timer, action, timer.start()),
        TimerAction::Pause => transition_response(timer, action, timer.pause()),
        TimerAction::Reset => transition_response(timer, action, timer.reset()),
        TimerAction::Stop => match timer.stop().await {
            Ok(StopOutcome::Saved { task_id, seconds }) => Ok((
                StatusCode::OK,
                Json(ApiResponse::new(
                    "saved",
                    format!("Saved {}s for task {}", seconds, task_id),
                    TimerView::from(timer),
                )),
            )),
            Ok(StopOutcome::Failed { reason, .. }) => Ok((
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::new("failed", reason, TimerView::from(timer))),
            )),
            Err(rejected) => {
                warn!("Stop rejected: {}", rejected);
                Err(ApiError::conflict(rejected.to_string()))
            }
        },
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Handle GET /status - Board overview
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();
    let cards = state
        .board
        .cards()
        .iter()
        .map(|(_, card)| CardView::from(card))
        .collect();

    Json(StatusResponse {
        focus: TimerView::from(state.board.focus().as_ref()),
        cards,
        total_tracked_seconds: state.board.total_tracked_seconds(),
        completed_saves: state.board.completed_saves(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /tasks - List mounted card timers
pub async fn list_cards_handler(State(state): State<Arc<AppState>>) -> Json<Vec<CardView>> {
    Json(
        state
            .board
            .cards()
            .iter()
            .map(|(_, card)| CardView::from(card))
            .collect(),
    )
}

/// Handle POST /tasks/:task_id/timer - Mount a card timer
pub async fn mount_card_handler(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<TaskId>,
    body: Option<Json<MountRequest>>,
) -> Result<(StatusCode, Json<CardView>), ApiError> {
    let Json(request) = body.unwrap_or_default();
    let created = state.board.mount(task_id.clone(), request.title);
    state.record_action(format!("mount task {}", task_id));

    let card = find_card(&state, &task_id)?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(CardView::from(&card))))
}

/// Handle GET /tasks/:task_id/timer - Read one card timer
pub async fn get_card_handler(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<TaskId>,
) -> Result<Json<CardView>, ApiError> {
    let card = find_card(&state, &task_id)?;
    Ok(Json(CardView::from(&card)))
}

/// Handle DELETE /tasks/:task_id/timer - Unmount and tear down a card timer
pub async fn unmount_card_handler(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<TaskId>,
) -> Result<StatusCode, ApiError> {
    if !state.board.unmount(&task_id) {
        return Err(ApiError::not_found(format!("No timer mounted for task {}", task_id)));
    }
    state.record_action(format!("unmount task {}", task_id));
    Ok(StatusCode::NO_CONTENT)
}

/// Handle POST /tasks/:task_id/timer/:action - Control a card timer
pub async fn card_action_handler(
    State(state): State<Arc<AppState>>,
    Path((task_id, action)): Path<(TaskId, TimerAction)>,
) -> ActionResult {
    let card = find_card(&state, &task_id)?;
    info!("Card action {} for task {}", action.as_str(), task_id);
    state.record_action(format!("{} task {}", action.as_str(), task_id));
    apply_action(&card.timer, action).await
}

/// Handle GET /focus - Read the focus timer
pub async fn get_focus_handler(State(state): State<Arc<AppState>>) -> Json<TimerView> {
    Json(TimerView::from(state.board.focus().as_ref()))
}

/// Handle POST /focus/select - Bind the focus timer to a task
pub async fn select_focus_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectFocusRequest>,
) -> ActionResult {
    let transition = state.board.select_focus(request.task_id.clone());
    let selected = request
        .task_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "none".to_string());
    state.record_action(format!("select focus {}", selected));

    let status = match transition {
        Transition::Applied => "applied",
        Transition::Unchanged => "unchanged",
    };
    let focus = state.board.focus();
    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(
            status,
            format!("Focus timer bound to task {}", selected),
            TimerView::from(focus.as_ref()),
        )),
    ))
}

/// Handle POST /focus/:action - Control the focus timer
pub async fn focus_action_handler(
    State(state): State<Arc<AppState>>,
    Path(action): Path<TimerAction>,
) -> ActionResult {
    info!("Focus action {}", action.as_str());
    state.record_action(format!("focus {}", action.as_str()));
    let focus = state.board.focus();
    apply_action(&focus, action).await
}

/// Handle GET /reports/daily - Daily report from the backend
pub async fn daily_report_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DailyReportQuery>,
) -> Result<Json<Value>, ApiError> {
    let report = backend(&state)?.daily_report(query.date).await.map_err(|e| {
        warn!("Daily report failed: {:#}", e);
        ApiError::bad_gateway(format!("{:#}", e))
    })?;
    Ok(Json(report))
}

/// Handle GET /reports/statistics - Statistics over a date range
pub async fn statistics_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<Value>, ApiError> {
    if query.start_date > query.end_date {
        return Err(ApiError::bad_request("start_date must not be after end_date"));
    }

    let stats = backend(&state)?
        .statistics(query.start_date, query.end_date)
        .await
        .map_err(|e| {
            warn!("Statistics failed: {:#}", e);
            ApiError::bad_gateway(format!("{:#}", e))
        })?;
    Ok(Json(stats))
}
