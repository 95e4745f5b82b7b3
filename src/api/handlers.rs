//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::state::{parse_component, AppState};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

/// Body of the minute/second edit endpoints
#[derive(Debug, Default, Deserialize)]
pub struct EditRequest {
    #[serde(default)]
    pub value: Value,
}

impl EditRequest {
    /// Coerce the submitted value to a whole number; anything unusable is 0
    pub fn as_component(&self) -> u32 {
        match &self.value {
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    u32::try_from(v).unwrap_or(u32::MAX)
                } else if let Some(f) = n.as_f64() {
                    // Saturating float-to-int cast; NaN and negatives become 0
                    f.trunc() as u32
                } else {
                    0
                }
            }
            Value::String(s) => parse_component(s),
            _ => 0,
        }
    }
}

fn edit_value(body: Option<Json<EditRequest>>) -> u32 {
    body.map(|Json(request)| request.as_component()).unwrap_or(0)
}

/// Handle POST /start - Start the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.start();
    info!("Start endpoint called - timer {}", timer.run_state.as_str());
    Json(ApiResponse::new("Start requested", timer))
}

/// Handle POST /pause - Pause the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.pause();
    info!("Pause endpoint called - timer {}", timer.run_state.as_str());
    Json(ApiResponse::new("Pause requested", timer))
}

/// Handle POST /toggle - Start when stopped, pause when running
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.toggle();
    info!("Toggle endpoint called - timer {}", timer.run_state.as_str());
    Json(ApiResponse::new("Start/pause toggled", timer))
}

/// Handle POST /reset - Back to 00:00 and idle
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.reset();
    info!("Reset endpoint called");
    Json(ApiResponse::new("Timer reset", timer))
}

/// Handle POST /minutes - Replace the minutes part
pub async fn minutes_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<EditRequest>>,
) -> Json<ApiResponse> {
    let minutes = edit_value(body);
    let timer = state.set_minutes(minutes);
    Json(ApiResponse::new(format!("Minutes set to {}", minutes), timer))
}

/// Handle POST /seconds - Replace the seconds part
pub async fn seconds_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<EditRequest>>,
) -> Json<ApiResponse> {
    let seconds = edit_value(body);
    let timer = state.set_seconds(seconds);
    Json(ApiResponse::new(format!("Seconds set to {}", seconds), timer))
}

/// Handle POST /acknowledge - Close the "time's up" alert
pub async fn acknowledge_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.acknowledge_finished();
    Json(ApiResponse::new("Alert acknowledged", timer))
}

/// Handle POST /sound/toggle - Flip and persist the sound preference
pub async fn sound_toggle_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.toggle_sound();
    let message = if timer.sound_enabled { "Sound enabled" } else { "Sound disabled" };
    Json(ApiResponse::new(message, timer))
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.snapshot(),
        uptime: state.get_uptime(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
