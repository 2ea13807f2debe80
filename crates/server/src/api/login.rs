//! Password grant endpoint.

use crate::api::OAUTH_TAG;
use crate::api::client::{ClientContext, access_token_cookie};
use crate::error::SessionError;
use crate::response::{ErrorBody, TokenResponse, no_store_json};
use crate::session::SessionStore;
use crate::state::AppState;
use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::{StatusCode, header::SET_COOKIE},
    response::Response,
};
use serde::Deserialize;
use utoipa::ToSchema;

/// The only grant this server understands.
pub const PASSWORD_GRANT: &str = "password";

/// Form fields of a login request. Credentials travel in clear text, so the
/// endpoint must only be exposed over TLS.
#[derive(Default, Deserialize, ToSchema)]
pub struct LoginForm {
    /// Must be `password`.
    pub grant_type: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

/// Log in with a username and password.
#[tracing::instrument(skip_all, fields(address = %client.address))]
#[utoipa::path(
    post,
    path = "/login",
    tag = OAUTH_TAG,
    operation_id = "Login",
    summary = "Exchange a username and password for an access token",
    description = "Resource Owner Password Credentials grant. On success the access token is returned \
                   in the body and set as the `access_token` cookie.\n\n\
                   The token is bound to the caller's address and user-agent: presenting it from a \
                   different client revokes it.",
    request_body(
        content = LoginForm,
        content_type = "application/x-www-form-urlencoded",
        description = "Grant type and credentials"
    ),
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 400, description = "invalid_request, unsupported_grant_type or invalid_grant", body = ErrorBody),
        (status = 503, description = "Session store unavailable", body = ErrorBody),
    )
)]
pub async fn login<S: SessionStore>(
    State(state): State<AppState<S>>,
    client: ClientContext,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, SessionError> {
    let Form(form) = form.map_err(|_| SessionError::InvalidRequest)?;
    let (Some(grant_type), Some(username), Some(password)) = (
        required(form.grant_type),
        required(form.username),
        required(form.password),
    ) else {
        return Err(SessionError::InvalidRequest);
    };
    if grant_type != PASSWORD_GRANT {
        return Err(SessionError::UnsupportedGrantType);
    }

    let Some(subject) = state.authenticator.authenticate(&username, &password).await else {
        tracing::info!("Rejected login attempt");
        return Err(SessionError::InvalidGrant);
    };

    let issued = state
        .sessions
        .issue(&subject, &client.address, &client.user_agent)
        .await?;
    let cookie = access_token_cookie(&issued.access_token, issued.expires_in, state.secure_cookie())
        .map_err(|e| SessionError::TokenGeneration(e.to_string()))?;

    tracing::info!(subject = %subject, "User logged in");
    let mut response = no_store_json(
        StatusCode::OK,
        TokenResponse::bearer(issued.access_token, issued.expires_in),
    );
    response.headers_mut().insert(SET_COOKIE, cookie);
    Ok(response)
}
