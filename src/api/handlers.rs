//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::{
    channel::{Command, CommandResponse},
    state::{format_remaining, AppState, TimerMode, TimerState},
    store::{MODE_KEY, REMAINING_TIME_KEY},
};
use super::responses::{HealthResponse, StatusResponse, StorageResponse};

/// Handle POST /command - Route a protocol message to the scheduler.
///
/// Messages that do not parse are logged and answered with an empty object,
/// so callers waiting on a reply are never left hanging.
pub async fn command_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CommandResponse>, StatusCode> {
    let message = match serde_json::from_slice::<Value>(&body) {
        Ok(message) => message,
        Err(e) => {
            warn!("Ignoring command that is not JSON: {}", e);
            return Ok(Json(CommandResponse::empty()));
        }
    };
    let Some(command) = Command::from_json(message.clone()) else {
        warn!("Ignoring unrecognized command: {}", message);
        return Ok(Json(CommandResponse::empty()));
    };

    debug!("Command endpoint called: {}", command.name());
    match state.dispatch(command).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Failed to deliver command: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /state - Shorthand for the getState command
pub async fn state_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerState>, StatusCode> {
    state.get_timer_state().await.map(Json).map_err(|e| {
        error!("Failed to get timer state: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Handle GET /storage - Return the durable snapshot displays poll
pub async fn storage_handler(State(state): State<Arc<AppState>>) -> Json<StorageResponse> {
    let stored = state.get_stored_state().await;

    Json(StorageResponse {
        mode: stored
            .get(MODE_KEY)
            .and_then(Value::as_str)
            .and_then(|m| m.parse::<TimerMode>().ok()),
        remaining_time: stored.get(REMAINING_TIME_KEY).and_then(Value::as_u64),
    })
}

/// Handle GET /events - Stream notifications as server-sent events.
///
/// Each connection is its own subscription and detaches when the client goes away.
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("Observer attached to event stream");
    let subscription = state.channel.subscribe();

    let events = stream::unfold(subscription, |mut subscription| async move {
        let notification = subscription.recv().await?;
        let event = Event::default().json_data(notification).unwrap_or_else(|e| {
            warn!("Failed to encode notification: {}", e);
            Event::default().comment("encoding error")
        });
        Some((Ok::<_, Infallible>(event), subscription))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /status - Return the timer and server overview
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.get_timer_state().await {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        display: format_remaining(timer.remaining_time),
        work_ms: state.durations.work_ms,
        break_ms: state.durations.break_ms,
        subscribers: state.channel.subscriber_count(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
