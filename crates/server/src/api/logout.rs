//! Logout endpoint.

use crate::api::OAUTH_TAG;
use crate::api::client::{AccessToken, clear_access_token_cookie};
use crate::error::SessionError;
use crate::response::{ErrorBody, no_store_json};
use crate::session::SessionStore;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::Response,
};
use serde_json::json;

/// End the session behind the presented token.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get,
    path = "/logout",
    tag = OAUTH_TAG,
    operation_id = "Logout",
    summary = "Revoke the current access token",
    description = "Deletes the session of the token given in the `access_token` query parameter or cookie, \
                   and expires the cookie. Succeeds with an empty object whether or not a token was \
                   presented or still valid.",
    params(
        ("access_token" = Option<String>, Query, description = "Token to revoke, if not sent as a cookie."),
    ),
    responses(
        (status = 200, description = "Logged out", content_type = "application/json", example = json!({})),
        (status = 503, description = "Session store unavailable", body = ErrorBody),
    )
)]
pub async fn logout<S: SessionStore>(
    State(state): State<AppState<S>>,
    token: AccessToken,
) -> Result<Response, SessionError> {
    state.sessions.revoke(token.as_deref()).await?;

    let mut response = no_store_json(StatusCode::OK, json!({}));
    response
        .headers_mut()
        .insert(SET_COOKIE, clear_access_token_cookie(state.secure_cookie()));
    Ok(response)
}
