use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::domain::StreamId;
use crate::presentation::state::AppState;

use super::ErrorResponse;

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub stream_id: String,
    pub stage: Option<String>,
    pub stages: Vec<String>,
    pub failed: bool,
    pub failed_task: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[tracing::instrument(skip(state))]
pub async fn job_status_handler(
    State(state): State<AppState>,
    Path(stream_id): Path<String>,
) -> impl IntoResponse {
    let stream_id = match StreamId::parse(&stream_id) {
        Ok(id) => id,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!("Invalid stream ID: {}", e))),
            )
                .into_response();
        }
    };

    match state.job_repository.get_by_id(&stream_id).await {
        Ok(Some(job)) => {
            let response = JobStatusResponse {
                stream_id: job.stream_id.to_string(),
                stage: job.latest_stage().map(|s| s.as_str().to_string()),
                stages: job.stages.iter().map(|s| s.as_str().to_string()).collect(),
                failed: job.failed_task.is_some(),
                failed_task: job.failed_task.map(|t| t.as_str().to_string()),
                created_at: job.created_at.to_rfc3339(),
                updated_at: job.updated_at.to_rfc3339(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("Job not found: {}", stream_id))),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch job status");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(format!("Failed to fetch job: {}", e))),
            )
                .into_response()
        }
    }
}
