use crate::error::SessionError;
use crate::session::{SubjectId, fingerprint, session_key, store::SessionStore};
use std::time::Duration;

/// Leading record fields needed to decide: signature and subject.
const REQUIRED_FIELDS: usize = 2;

/// Authorizes requests against stored sessions.
///
/// Every successful validation pushes the session's expiry out to the full
/// TTL again, so an active client stays logged in and an idle one times out.
#[derive(Clone)]
pub struct SessionValidator<S> {
    store: S,
    ttl: Duration,
}

impl<S: SessionStore> SessionValidator<S> {
    pub fn new(store: S, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Resolve `token` to the subject it was issued for.
    ///
    /// A token presented from a different address or user-agent than at login
    /// is treated as stolen: its session is deleted before rejecting.
    #[tracing::instrument(skip(self, token, user_agent))]
    pub async fn validate(
        &self,
        token: Option<&str>,
        client_address: &str,
        user_agent: &str,
    ) -> Result<SubjectId, SessionError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::InvalidRequest)?;
        let key = session_key(token);

        let record = self.store.read_prefix(&key, REQUIRED_FIELDS).await?;
        let [stored_signature, subject] = <[String; REQUIRED_FIELDS]>::try_from(record)
            .map_err(|_| SessionError::InvalidGrant)?;

        if fingerprint::sign(token, client_address, user_agent) != stored_signature {
            tracing::warn!("Fingerprint mismatch, revoking session");
            self.store.delete(&key).await?;
            return Err(SessionError::InvalidGrant);
        }

        if !self.store.refresh_ttl(&key, self.ttl).await? {
            // Revoked or expired between the read and the refresh.
            return Err(SessionError::InvalidGrant);
        }

        Ok(SubjectId::new(subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::issuer::TokenIssuer;
    use crate::session::memory::MemoryStore;

    const TTL: Duration = Duration::from_secs(3600);

    async fn issue(store: &MemoryStore) -> String {
        TokenIssuer::new(store.clone(), TTL)
            .issue(&SubjectId::from(42), "203.0.113.5", "UA-A")
            .await
            .unwrap()
            .access_token
    }

    #[tokio::test]
    async fn missing_token_is_invalid_request() {
        let validator = SessionValidator::new(MemoryStore::new(), TTL);

        let err = validator.validate(None, "203.0.113.5", "UA-A").await;
        assert!(matches!(err, Err(SessionError::InvalidRequest)));

        let err = validator.validate(Some(""), "203.0.113.5", "UA-A").await;
        assert!(matches!(err, Err(SessionError::InvalidRequest)));
    }

    #[tokio::test]
    async fn unknown_token_is_invalid_grant() {
        let validator = SessionValidator::new(MemoryStore::new(), TTL);

        let err = validator
            .validate(Some("no-such-token"), "203.0.113.5", "UA-A")
            .await;
        assert!(matches!(err, Err(SessionError::InvalidGrant)));
    }

    #[tokio::test]
    async fn truncated_record_is_invalid_grant() {
        let store = MemoryStore::new();
        let token = "partial";
        let signature = fingerprint::sign(token, "203.0.113.5", "UA-A");
        store
            .create(&session_key(token), &[signature], TTL)
            .await
            .unwrap();

        let validator = SessionValidator::new(store, TTL);
        let err = validator.validate(Some(token), "203.0.113.5", "UA-A").await;
        assert!(matches!(err, Err(SessionError::InvalidGrant)));
    }

    #[tokio::test]
    async fn matching_fingerprint_returns_subject() {
        let store = MemoryStore::new();
        let token = issue(&store).await;
        let validator = SessionValidator::new(store, TTL);

        let subject = validator
            .validate(Some(&token), "203.0.113.5", "UA-A")
            .await
            .unwrap();
        assert_eq!(subject, SubjectId::from(42));
    }

    #[tokio::test]
    async fn user_agent_mismatch_revokes_session() {
        let store = MemoryStore::new();
        let token = issue(&store).await;
        let validator = SessionValidator::new(store.clone(), TTL);

        let err = validator.validate(Some(&token), "203.0.113.5", "UA-B").await;
        assert!(matches!(err, Err(SessionError::InvalidGrant)));
        assert!(!store.contains(&session_key(&token)));

        let err = validator.validate(Some(&token), "203.0.113.5", "UA-A").await;
        assert!(matches!(err, Err(SessionError::InvalidGrant)));
    }

    #[tokio::test(start_paused = true)]
    async fn validation_slides_expiry() {
        let store = MemoryStore::new();
        let token = issue(&store).await;
        let validator = SessionValidator::new(store.clone(), TTL);

        tokio::time::advance(TTL - Duration::from_secs(1)).await;
        validator
            .validate(Some(&token), "203.0.113.5", "UA-A")
            .await
            .unwrap();
        assert_eq!(store.ttl(&session_key(&token)), Some(TTL));

        tokio::time::advance(Duration::from_secs(10)).await;
        validator
            .validate(Some(&token), "203.0.113.5", "UA-A")
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn idle_session_expires() {
        let store = MemoryStore::new();
        let token = issue(&store).await;
        let validator = SessionValidator::new(store, TTL);

        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        let err = validator.validate(Some(&token), "203.0.113.5", "UA-A").await;
        assert!(matches!(err, Err(SessionError::InvalidGrant)));
    }
}
