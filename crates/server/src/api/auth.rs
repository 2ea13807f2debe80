//! Guard for protected operations.
//!
//! Two ways to put a handler behind a valid session:
//!
//! - take [`Authenticated`] as the first argument of the handler;
//! - wrap a group of routes with [`require_session`], after which handlers can
//!   read the subject through `Extension<SubjectId>`.
//!
//! Either way the session is validated, its TTL refreshed, and the downstream
//! handler only runs on success.

use crate::api::client::{AccessToken, ClientContext};
use crate::error::SessionError;
use crate::session::{SessionStore, SubjectId};
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

/// Subject of the session the request's access token belongs to.
///
/// # Example
///
/// ```ignore
/// async fn hello(Authenticated(subject): Authenticated) -> String {
///     format!("Hello, {subject}")
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated(pub SubjectId);

impl<S: SessionStore> FromRequestParts<AppState<S>> for Authenticated {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let token = AccessToken::from_parts(parts);
        let client = ClientContext::from_parts(parts);

        let subject = state
            .sessions
            .validate(token.as_deref(), &client.address, &client.user_agent)
            .await?;
        Ok(Authenticated(subject))
    }
}

/// Middleware rejecting requests without a valid session.
///
/// ```ignore
/// let protected = Router::new()
///     .route("/profile", get(profile))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_session));
/// ```
pub async fn require_session(
    Authenticated(subject): Authenticated,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(subject);
    next.run(request).await
}
