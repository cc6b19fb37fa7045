use axum::{http::StatusCode, response::IntoResponse};
use service_core::error::AppError;

/// Prometheus metrics endpoint.
pub async fn metrics() -> Result<impl IntoResponse, AppError> {
    let body = crate::services::get_metrics().ok_or(AppError::ServiceUnavailable)?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    ))
}
