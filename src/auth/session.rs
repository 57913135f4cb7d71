use std::sync::{Arc, RwLock};

use chrono::{DateTime, TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::auth::claims::Claims;

/// The signed-in account. The ID token doubles as the bearer credential for
/// the generation and grading API.
#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
    id_token: SecretString,
}

impl Session {
    pub fn from_claims(claims: &Claims, id_token: &str) -> Self {
        let expires_at = Utc
            .timestamp_opt(claims.exp as i64, 0)
            .single()
            .unwrap_or_else(Utc::now);

        Self {
            user_id: claims.sub.clone(),
            email: claims.email.clone(),
            expires_at,
            id_token: SecretString::from(id_token.to_string()),
        }
    }

    pub fn bearer(&self) -> &str {
        self.id_token.expose_secret()
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Local part of the account email, used to name the user's blobs.
    pub fn email_local_part(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// Holder for the current session, created at startup and handed to whatever
/// needs to know who is signed in.
#[derive(Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, session: Session) {
        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        *guard = Some(session);
    }

    /// The current session, or `None` when signed out or expired.
    pub fn current(&self) -> Option<Session> {
        let guard = self.inner.read().unwrap_or_else(|p| p.into_inner());
        guard.as_ref().filter(|s| !s.is_expired()).cloned()
    }

    pub fn clear(&self) -> Option<Session> {
        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        guard.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expiration_hours: i64) -> Session {
        let claims = Claims::new("uid-1", "student.kim@example.com", expiration_hours);
        Session::from_claims(&claims, "token-abc")
    }

    #[test]
    fn session_exposes_bearer_and_local_part() {
        let session = session(1);
        assert_eq!(session.bearer(), "token-abc");
        assert_eq!(session.email_local_part(), "student.kim");
        assert!(!session.is_expired());
    }

    #[test]
    fn context_installs_and_clears() {
        let context = SessionContext::new();
        assert!(context.current().is_none());

        context.install(session(1));
        assert_eq!(context.current().map(|s| s.user_id), Some("uid-1".to_string()));

        let cleared = context.clear();
        assert!(cleared.is_some());
        assert!(context.current().is_none());
    }

    #[test]
    fn expired_session_is_not_current() {
        let context = SessionContext::new();
        context.install(session(-1));
        assert!(context.current().is_none());
    }

    #[test]
    fn clones_share_the_same_session() {
        let context = SessionContext::new();
        let handle = context.clone();
        context.install(session(1));
        assert!(handle.current().is_some());
    }
}
