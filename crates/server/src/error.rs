use axum::http::StatusCode;
use thiserror::Error;

/// Failures talking to the session store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session store did not answer within {0:?}")]
    Timeout(std::time::Duration),
    #[error("Session store backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Outcome of a failed login, validation or revocation.
///
/// The three `invalid_*` style variants are what clients get to see. They carry
/// no detail on purpose: a caller cannot tell a wrong password from an unknown
/// user, or an expired token from a hijacked one.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid_request")]
    InvalidRequest,
    #[error("unsupported_grant_type")]
    UnsupportedGrantType,
    #[error("invalid_grant")]
    InvalidGrant,
    #[error("Session store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    #[error("Failed to generate access token: {0}")]
    TokenGeneration(String),
}

impl SessionError {
    /// OAuth2 error code sent in the `error` field of the response body.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::InvalidRequest => "invalid_request",
            SessionError::UnsupportedGrantType => "unsupported_grant_type",
            SessionError::InvalidGrant => "invalid_grant",
            SessionError::StoreUnavailable(_) => "temporarily_unavailable",
            SessionError::TokenGeneration(_) => "server_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SessionError::InvalidRequest
            | SessionError::UnsupportedGrantType
            | SessionError::InvalidGrant => StatusCode::BAD_REQUEST,
            SessionError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SessionError::TokenGeneration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Infrastructure faults, as opposed to a client presenting bad input.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            SessionError::StoreUnavailable(_) | SessionError::TokenGeneration(_)
        )
    }
}
