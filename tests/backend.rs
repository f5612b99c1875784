use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    body::{to_bytes, Body},
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use task_timer::{
    create_router,
    services::{BackendClient, TimeEntryStore},
    tasks::sync_assigned_tasks,
    AppState, TaskId, TimerVariant,
};
use tokio::net::TcpListener;
use tower::ServiceExt;

#[derive(Clone, Default)]
struct Captured {
    entries: Arc<Mutex<Vec<(Value, Option<String>)>>>,
}

async fn record_entry(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    captured.entries.lock().unwrap().push((body, auth));
    StatusCode::CREATED
}

async fn assigned_tasks() -> Json<Value> {
    Json(json!([
        { "id": 1, "title": "Write report", "status": "todo", "priority": "high" },
        { "id": 2, "title": "Review PR" }
    ]))
}

/// Echoes the query it was called with so tests can see what was forwarded
async fn daily_report(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "date": query.get("date").cloned().unwrap_or_else(|| "today".to_string()),
        "total_seconds": 5400,
        "tasks": [{ "task_id": 1, "title": "Write report", "total_seconds": 5400 }]
    }))
}

async fn statistics(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "start_date": query["start_date"],
        "end_date": query["end_date"],
        "total_seconds": 7200,
        "task_count": 2
    }))
}

fn reports_backend() -> Router {
    Router::new()
        .route("/reports/daily", get(daily_report))
        .route("/reports/statistics", get(statistics))
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "database is down")
}

async fn spawn_backend(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str, token: Option<&str>) -> BackendClient {
    BackendClient::new(base_url, token.map(str::to_string), Duration::from_secs(5)).unwrap()
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn app_with_backend(backend: Option<BackendClient>) -> Router {
    let store = client("http://127.0.0.1:9", None);
    let mut state = AppState::new(0, "127.0.0.1".to_string(), TimerVariant::stopwatch(), Arc::new(store));
    if let Some(backend) = backend {
        state = state.with_backend(backend);
    }
    create_router(Arc::new(state))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn records_time_entries_with_bearer_token() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/api/time_tracking/", post(record_entry))
        .with_state(captured.clone());
    let base_url = spawn_backend(app).await;

    let client = client(&format!("{}/", base_url), Some("secret"));
    client.record(&TaskId::from(7), 120).await.unwrap();

    let entries = captured.entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, json!({ "task_id": 7, "duration_seconds": 120 }));
    assert_eq!(entries[0].1.as_deref(), Some("Bearer secret"));
}

#[tokio::test]
async fn omits_authorization_without_a_token() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/api/time_tracking/", post(record_entry))
        .with_state(captured.clone());
    let base_url = spawn_backend(app).await;

    client(&base_url, None)
        .record_time_entry(&TaskId::from("T1"), 5)
        .await
        .unwrap();

    let entries = captured.entries.lock().unwrap();
    assert_eq!(entries[0].0["task_id"], "T1");
    assert_eq!(entries[0].1, None);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let app = Router::new().route("/api/time_tracking/", post(broken));
    let base_url = spawn_backend(app).await;

    let err = client(&base_url, None)
        .record(&TaskId::from(1), 60)
        .await
        .unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("500"));
    assert!(message.contains("database is down"));
}

#[tokio::test]
async fn unreachable_backend_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = client(&format!("http://{}", addr), None)
        .record(&TaskId::from(1), 60)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn lists_assigned_tasks() {
    let app = Router::new().route("/tasks/my/assigned", get(assigned_tasks));
    let base_url = spawn_backend(app).await;

    let tasks = client(&base_url, None).assigned_tasks().await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, TaskId::from(1));
    assert_eq!(tasks[0].priority.as_deref(), Some("high"));
    assert_eq!(tasks[1].title, "Review PR");
    assert_eq!(tasks[1].status, None);
}

#[tokio::test]
async fn sync_mounts_assigned_tasks_on_the_board() {
    let app = Router::new().route("/tasks/my/assigned", get(assigned_tasks));
    let base_url = spawn_backend(app).await;
    let client = client(&base_url, None);

    let state = AppState::new(
        0,
        "127.0.0.1".to_string(),
        TimerVariant::stopwatch(),
        Arc::new(client.clone()),
    );
    state.board.mount(TaskId::from(99), None);

    let summary = sync_assigned_tasks(&state, &client).await.unwrap();
    assert_eq!(summary.mounted, vec![TaskId::from(1), TaskId::from(2)]);
    assert_eq!(summary.unmounted, vec![TaskId::from(99)]);
    assert_eq!(
        state.board.card(&TaskId::from(1)).unwrap().title.as_deref(),
        Some("Write report")
    );
}

#[tokio::test]
async fn sync_failure_leaves_the_board_alone() {
    let app = Router::new().route("/tasks/my/assigned", get(broken));
    let base_url = spawn_backend(app).await;
    let client = client(&base_url, None);

    let state = AppState::new(0, "127.0.0.1".to_string(), TimerVariant::stopwatch(), Arc::new(client.clone()));
    state.board.mount(TaskId::from(3), None);

    assert!(sync_assigned_tasks(&state, &client).await.is_err());
    assert!(state.board.card(&TaskId::from(3)).is_some());
}

#[tokio::test]
async fn fetches_daily_report_for_a_date() {
    let base_url = spawn_backend(reports_backend()).await;
    let client = client(&base_url, None);

    let report = client.daily_report(Some(date("2024-03-01"))).await.unwrap();
    assert_eq!(report["date"], "2024-03-01");
    assert_eq!(report["total_seconds"], 5400);

    let report = client.daily_report(None).await.unwrap();
    assert_eq!(report["date"], "today");
}

#[tokio::test]
async fn fetches_statistics_for_a_range() {
    let base_url = spawn_backend(reports_backend()).await;

    let stats = client(&base_url, None)
        .statistics(date("2024-03-01"), date("2024-03-07"))
        .await
        .unwrap();
    assert_eq!(stats["start_date"], "2024-03-01");
    assert_eq!(stats["end_date"], "2024-03-07");
    assert_eq!(stats["task_count"], 2);
}

#[tokio::test]
async fn report_endpoints_pass_backend_payloads_through() {
    let base_url = spawn_backend(reports_backend()).await;
    let app = app_with_backend(Some(client(&base_url, None)));

    let (status, body) = get_json(app.clone(), "/reports/daily?date=2024-03-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], "2024-03-01");
    assert_eq!(body["tasks"][0]["title"], "Write report");

    let (status, body) = get_json(app, "/reports/statistics?start_date=2024-03-01&end_date=2024-03-07").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_seconds"], 7200);
}

#[tokio::test]
async fn report_endpoints_map_backend_failures_to_bad_gateway() {
    let app = Router::new()
        .route("/reports/daily", get(broken))
        .route("/reports/statistics", get(broken));
    let base_url = spawn_backend(app).await;
    let app = app_with_backend(Some(client(&base_url, None)));

    let (status, body) = get_json(app.clone(), "/reports/daily").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("database is down"));

    let (status, _) = get_json(app, "/reports/statistics?start_date=2024-03-01&end_date=2024-03-02").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn statistics_rejects_an_inverted_range() {
    let base_url = spawn_backend(reports_backend()).await;
    let app = app_with_backend(Some(client(&base_url, None)));

    let (status, body) = get_json(app, "/reports/statistics?start_date=2024-03-07&end_date=2024-03-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "start_date must not be after end_date");
}

#[tokio::test]
async fn reports_without_a_backend_are_unavailable() {
    let app = app_with_backend(None);

    let (status, _) = get_json(app, "/reports/daily").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
