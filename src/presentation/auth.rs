use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::presentation::handlers::ErrorResponse;
use crate::presentation::state::AppState;

/// Compares in time independent of where the inputs first differ.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Accepts `Authorization: <token>` or `Authorization: Bearer <token>`
/// matching the processor token.
pub async fn require_processor_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).trim());

    let authorized = match presented {
        Some(token) if !state.processor_token.is_empty() => {
            constant_time_eq(token.as_bytes(), state.processor_token.as_bytes())
        }
        _ => false,
    };

    if !authorized {
        tracing::warn!("Rejected request with missing or invalid processor token");
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(ErrorResponse::new("invalid or missing processor token")),
        )
            .into_response();
    }

    next.run(request).await
}
