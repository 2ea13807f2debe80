//! What a request tells us about its client: origin, user-agent and the
//! access token it presents.

use crate::session::fingerprint::resolve_client_address;
use axum::{
    extract::{ConnectInfo, FromRequestParts, Query},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, InvalidHeaderValue, USER_AGENT},
        request::Parts,
    },
};
use serde::Deserialize;
use std::convert::Infallible;
use std::net::SocketAddr;

/// Name of both the query parameter and the cookie carrying the token.
pub const ACCESS_TOKEN: &str = "access_token";

/// Address and user-agent a request is fingerprinted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    pub address: String,
    pub user_agent: String,
}

impl ClientContext {
    pub fn from_parts(parts: &Parts) -> Self {
        // Several X-Forwarded-For lines count as one comma separated list.
        let forwarded_for = parts
            .headers
            .get_all("x-forwarded-for")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Self {
            address: resolve_client_address(
                Some(forwarded_for.as_str()).filter(|s| !s.is_empty()),
                peer,
            ),
            user_agent,
        }
    }
}

impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[derive(Debug, Deserialize)]
struct TokenParams {
    access_token: Option<String>,
}

/// Access token from the `access_token` query parameter, or else the cookie of
/// the same name. `None` when neither carries a non-empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub Option<String>);

impl AccessToken {
    pub fn from_parts(parts: &Parts) -> Self {
        let from_query = Query::<TokenParams>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(params)| params.access_token)
            .filter(|t| !t.is_empty());
        Self(from_query.or_else(|| token_from_cookie(&parts.headers)))
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

fn token_from_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == ACCESS_TOKEN)
        .map(|(_, value)| value.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// `Set-Cookie` value handing the token to the browser for `max_age` seconds.
pub fn access_token_cookie(
    token: &str,
    max_age: u64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{ACCESS_TOKEN}={token}; Path=/; HttpOnly; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// `Set-Cookie` value telling the browser to drop the token.
pub fn clear_access_token_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static("access_token=; Path=/; HttpOnly; Max-Age=0; Secure")
    } else {
        HeaderValue::from_static("access_token=; Path=/; HttpOnly; Max-Age=0")
    }
}
