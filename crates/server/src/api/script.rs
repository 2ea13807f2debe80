//! Browser helper script.

use crate::api::OAUTH_TAG;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;

/// Script turning `<form class="oauth">` elements into password grant logins.
pub const OAUTH_CLIENT_JS: &str = include_str!("../../assets/oauth_client.js");

#[tracing::instrument()]
#[utoipa::path(
    get,
    path = "/js/oauth_client.js",
    tag = OAUTH_TAG,
    operation_id = "Login Helper Script",
    summary = "Client-side login helper",
    description = "JavaScript that submits every `form.oauth` on the page as a password grant and passes \
                   the JSON response to `window.oauthResponseHandler`.",
    responses(
        (status = 200, description = "The script", body = str, content_type = "application/javascript")
    )
)]
pub async fn oauth_client_script() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "application/javascript; charset=utf-8")],
        OAUTH_CLIENT_JS,
    )
}
