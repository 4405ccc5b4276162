use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::auth::require_processor_token;
use crate::presentation::handlers::{health_handler, job_status_handler, submit_task_handler};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let api = Router::new()
        .route("/api/v1/tasks", post(submit_task_handler))
        .route("/api/v1/jobs/{stream_id}", get(job_status_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_processor_token,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(api)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
