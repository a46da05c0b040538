use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use focus_timer::{
    api::create_router,
    channel::ObserverChannel,
    state::{AppState, Durations},
    store::{MemoryStore, StateStore},
    tasks::{timer_scheduler_task, TimerScheduler, TICK_PERIOD},
};

fn app() -> Router {
    let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
    let durations = Durations::default();
    let (channel, commands) = ObserverChannel::new();
    let (scheduler, ticks) =
        TimerScheduler::new(Arc::clone(&store), durations, channel.notifier(), TICK_PERIOD);
    tokio::spawn(timer_scheduler_task(scheduler, ticks, commands));

    let state = AppState::new(channel, store, durations, 0, "127.0.0.1".to_string());
    create_router(Arc::new(state))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn command(app: &Router, body: &str) -> (StatusCode, Value) {
    let request = Request::post("/command")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn command_protocol_round_trip() {
    let app = app();

    let (status, body) = command(&app, r#"{"command":"start","time":10000}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "started"}));

    let (_, body) = command(&app, r#"{"command":"pause"}"#).await;
    assert_eq!(body, json!({"status": "paused"}));

    let (_, body) = command(&app, r#"{"command":"getState"}"#).await;
    assert_eq!(body["isRunning"], json!(false));
    assert_eq!(body["mode"], json!("work"));

    let (_, body) = command(&app, r#"{"command":"switchMode","newMode":"break"}"#).await;
    assert_eq!(body, json!({"mode": "break"}));

    let (_, body) = command(&app, r#"{"command":"reset"}"#).await;
    assert_eq!(body, json!({"status": "reset"}));

    let (_, body) = get(&app, "/state").await;
    assert_eq!(body, json!({"remainingTime": 300_000, "isRunning": false, "mode": "break"}));
}

#[tokio::test]
async fn unknown_and_malformed_commands_get_empty_reply() {
    let app = app();

    let (status, body) = command(&app, r#"{"command":"selfDestruct"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, body) = command(&app, "definitely not json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (_, body) = get(&app, "/state").await;
    assert_eq!(body["remainingTime"], json!(1_500_000));
}

#[tokio::test]
async fn storage_reflects_write_through() {
    let app = app();

    let (_, body) = get(&app, "/storage").await;
    assert_eq!(body, json!({"mode": null, "remainingTime": null}));

    command(&app, r#"{"command":"switchMode","newMode":"break"}"#).await;
    let (_, body) = get(&app, "/storage").await;
    assert_eq!(body, json!({"mode": "break", "remainingTime": 300_000}));
}

#[tokio::test]
async fn status_tracks_last_action() {
    let app = app();
    command(&app, r#"{"command":"start","time":600000}"#).await;
    command(&app, r#"{"command":"reset"}"#).await;
    command(&app, r#"{"command":"getState"}"#).await;

    let (status, body) = get(&app, "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["last_action"], json!("reset"));
    assert_eq!(body["timer"]["isRunning"], json!(false));
    assert_eq!(body["display"], json!("25:00"));
    assert_eq!(body["work_ms"], json!(1_500_000));
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
}
