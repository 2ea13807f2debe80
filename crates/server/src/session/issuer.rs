use crate::error::SessionError;
use crate::session::{SubjectId, fingerprint, session_key, store::SessionStore};
use base64::Engine;
use std::time::Duration;

/// Number of random bytes behind every access token.
pub const TOKEN_BYTES: usize = 32;

/// A freshly issued access token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub signature: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

/// Generate an opaque access token.
///
/// Returns [`TOKEN_BYTES`] bytes from the OS random source, URL-safe base64
/// encoded without padding.
pub fn generate_token() -> Result<String, SessionError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    getrandom::fill(&mut bytes).map_err(|e| SessionError::TokenGeneration(e.to_string()))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Creates new sessions.
#[derive(Clone)]
pub struct TokenIssuer<S> {
    store: S,
    ttl: Duration,
}

impl<S: SessionStore> TokenIssuer<S> {
    pub fn new(store: S, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Issue a token for `subject` and persist its session record.
    ///
    /// Nothing is returned unless the record was written.
    #[tracing::instrument(skip(self, subject, user_agent), fields(subject = %subject))]
    pub async fn issue(
        &self,
        subject: &SubjectId,
        client_address: &str,
        user_agent: &str,
    ) -> Result<IssuedToken, SessionError> {
        let access_token = generate_token()?;
        let signature = fingerprint::sign(&access_token, client_address, user_agent);

        let fields = [
            signature.clone(),
            subject.to_string(),
            client_address.to_string(),
            user_agent.to_string(),
        ];
        self.store
            .create(&session_key(&access_token), &fields, self.ttl)
            .await?;

        tracing::debug!("Session created");
        Ok(IssuedToken {
            access_token,
            signature,
            expires_in: self.ttl.as_secs(),
        })
    }
}
