use super::client::IdentityClient;
use super::session::{Session, SessionStore, User};
use super::AuthError;
use chrono::Utc;
use std::sync::Arc;

/// Server-side revocation of a session that has already been forgotten
/// locally.
pub struct PendingRevoke {
    client: Arc<IdentityClient>,
    session: Session,
}

impl PendingRevoke {
    /// Call the identity service. Failure is logged, never returned.
    pub async fn run(self) {
        if let Err(e) = self.client.sign_out(&self.session).await {
            tracing::error!(error = %e, "Error logging out");
        }
    }
}

/// Lifecycle of an [`AuthContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    /// Created, stored session not yet loaded.
    Initializing,
    /// Session (or its absence) is known and may be read.
    Active,
    /// Ended; no session is reported and no calls are made.
    TornDown,
}

/// Holder of the current session, passed explicitly to whatever needs it.
///
/// Without an [`IdentityClient`] auth is disabled: the context still becomes
/// active, reports no session, and sign-out is a no-op.
pub struct AuthContext {
    phase: AuthPhase,
    client: Option<Arc<IdentityClient>>,
    store: SessionStore,
    session: Option<Session>,
}

impl AuthContext {
    pub fn new(client: Option<IdentityClient>, store: SessionStore) -> Self {
        Self {
            phase: AuthPhase::Initializing,
            client: client.map(Arc::new),
            store,
            session: None,
        }
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> Option<&IdentityClient> {
        self.client.as_deref()
    }

    /// Load the stored session and become active.
    ///
    /// An expired session is refreshed when possible, otherwise discarded.
    pub async fn init(&mut self) -> Result<(), AuthError> {
        if self.phase != AuthPhase::Initializing {
            return Err(AuthError::InvalidPhase(self.phase));
        }

        let Some(client) = &self.client else {
            tracing::debug!("No identity service configured, auth disabled");
            self.phase = AuthPhase::Active;
            return Ok(());
        };

        let mut session = self.store.load()?;
        if let Some(stored) = session.take() {
            if stored.is_expired(Utc::now()) {
                match client.refresh_session(&stored).await {
                    Ok(fresh) => {
                        self.store.save(&fresh)?;
                        session = Some(fresh);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Stored session expired and could not be refreshed");
                        self.store.clear()?;
                    }
                }
            } else {
                session = Some(stored);
            }
        }

        if let Some(s) = &session {
            tracing::info!(user_id = %s.user.id, "Restored session");
        }
        self.session = session;
        self.phase = AuthPhase::Active;
        Ok(())
    }

    /// Current session; `None` unless active and signed in.
    pub fn session(&self) -> Option<&Session> {
        match self.phase {
            AuthPhase::Active => self.session.as_ref(),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session().map(|s| &s.user)
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<&User, AuthError> {
        self.require_active()?;
        let client = self.client.as_ref().ok_or(AuthError::NotConfigured)?;
        let session = client.sign_in_with_password(email, password).await?;
        self.store.save(&session)?;
        Ok(&self.session.insert(session).user)
    }

    /// Revoke the session remotely and forget it locally.
    ///
    /// The local session is cleared even if the remote call fails; that
    /// failure is only logged. Signed out already → no-op.
    pub async fn sign_out(&mut self) -> Result<(), AuthError> {
        if let Some(revoke) = self.sign_out_local()? {
            revoke.run().await;
        }
        Ok(())
    }

    /// Forget the session locally and hand back the remote revoke, so a
    /// caller that must not block can run it elsewhere.
    ///
    /// Returns `None` when nobody is signed in or auth is disabled.
    pub fn sign_out_local(&mut self) -> Result<Option<PendingRevoke>, AuthError> {
        self.require_active()?;
        let Some(session) = self.session.take() else {
            return Ok(None);
        };

        self.store.clear()?;
        tracing::info!(user_id = %session.user.id, "Signed out");

        Ok(self.client.as_ref().map(|client| PendingRevoke {
            client: Arc::clone(client),
            session,
        }))
    }

    /// End the lifecycle. The stored session is left on disk.
    pub fn tear_down(&mut self) {
        if self.phase != AuthPhase::TornDown {
            tracing::debug!("Auth context torn down");
        }
        self.session = None;
        self.phase = AuthPhase::TornDown;
    }

    fn require_active(&self) -> Result<(), AuthError> {
        match self.phase {
            AuthPhase::Active => Ok(()),
            other => Err(AuthError::InvalidPhase(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled(name: &str) -> AuthContext {
        let path = std::env::temp_dir().join(format!("newsman_ctx_test_{name}.json"));
        AuthContext::new(None, SessionStore::new(path))
    }

    #[tokio::test]
    async fn disabled_context_becomes_active_without_session() {
        let mut ctx = disabled("disabled");
        assert_eq!(ctx.phase(), AuthPhase::Initializing);
        ctx.init().await.unwrap();
        assert_eq!(ctx.phase(), AuthPhase::Active);
        assert!(!ctx.is_enabled());
        assert!(ctx.session().is_none());
        ctx.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn sign_in_without_service_is_not_configured() {
        let mut ctx = disabled("no_service");
        ctx.init().await.unwrap();
        let err = ctx.sign_in("a@b.c", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::NotConfigured));
    }

    #[tokio::test]
    async fn operations_before_init_are_rejected() {
        let mut ctx = disabled("before_init");
        let err = ctx.sign_out().await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidPhase(AuthPhase::Initializing)));
    }

    #[tokio::test]
    async fn torn_down_context_reports_nothing() {
        let mut ctx = disabled("torn_down");
        ctx.init().await.unwrap();
        ctx.tear_down();
        assert_eq!(ctx.phase(), AuthPhase::TornDown);
        assert!(ctx.user().is_none());
        assert!(ctx.init().await.is_err());
    }
}
