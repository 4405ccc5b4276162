use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;

use crate::application::services::TaskEnvelope;
use crate::presentation::state::AppState;

use super::ErrorResponse;

#[derive(Debug, Serialize)]
pub struct TaskAcceptedResponse {
    pub stream_id: String,
}

/// Validates a task envelope and queues it for the worker.
#[tracing::instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn submit_task_handler(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let envelope: TaskEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected malformed task envelope");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!("malformed task envelope: {}", e))),
            )
                .into_response();
        }
    };

    let task = match envelope.validate() {
        Ok(task) => task,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected invalid task payload");
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response();
        }
    };

    let stream_id = task.stream_id.to_string();
    let kind = task.kind();

    match state.task_sender.try_send(task) {
        Ok(()) => {
            tracing::info!(stream_id = %stream_id, task = %kind, "Task queued");
            (StatusCode::ACCEPTED, Json(TaskAcceptedResponse { stream_id })).into_response()
        }
        Err(TrySendError::Full(_)) => {
            tracing::warn!(stream_id = %stream_id, task = %kind, "Task queue full");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("task queue is full, retry later")),
            )
                .into_response()
        }
        Err(TrySendError::Closed(_)) => {
            tracing::error!("Task worker is not running");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("task worker unavailable")),
            )
                .into_response()
        }
    }
}
