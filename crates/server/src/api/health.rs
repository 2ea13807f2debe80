//! Liveness probe.

use axum::http::header::CACHE_CONTROL;
use axum::response::IntoResponse;

/// Tag for OpenAPI documentation.
pub const MISC_TAG: &str = "Miscellaneous";

/// Answers as long as the process serves HTTP. Redis is not contacted, so a
/// store outage shows up as 503s on login and guarded routes, not here.
#[utoipa::path(
    get,
    path = "/healthz",
    tag = MISC_TAG,
    operation_id = "Liveness",
    summary = "Process liveness",
    responses(
        (status = 200, description = "Serving requests", body = str, content_type = "text/plain", example = "ok")
    )
)]
pub async fn health() -> impl IntoResponse {
    ([(CACHE_CONTROL, "no-store")], "ok")
}
