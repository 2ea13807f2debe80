use crate::error::SessionError;
use crate::session::{session_key, store::SessionStore};

/// Ends sessions on logout.
#[derive(Clone)]
pub struct Revoker<S> {
    store: S,
}

impl<S: SessionStore> Revoker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Delete the session behind `token`. Without a token there is nothing to
    /// do, and unknown tokens are fine too.
    #[tracing::instrument(skip_all)]
    pub async fn revoke(&self, token: Option<&str>) -> Result<(), SessionError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(());
        };
        self.store.delete(&session_key(token)).await?;
        tracing::debug!("Session revoked");
        Ok(())
    }
}
