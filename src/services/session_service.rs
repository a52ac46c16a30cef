use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::models::session::{ClientInfo, RevocationReason, Session};
use crate::repositories::RepositoryError;
use crate::repositories::session_repository::SessionRepository;

/// Session manager errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,

    #[error("Session has been revoked ({0})")]
    Revoked(RevocationReason),

    #[error("Session expired due to inactivity")]
    IdleTimeout,

    #[error("Session has expired")]
    Expired,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for SessionError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => SessionError::NotFound,
            RepositoryError::DatabaseError(msg) | RepositoryError::ConstraintViolation(msg) => {
                SessionError::DatabaseError(msg)
            }
        }
    }
}

/// Trait defining session lifecycle operations
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Start a new session for a user
    async fn create(&self, user_id: Uuid, client: ClientInfo) -> Result<Session, SessionError>;

    /// Confirm a session is live for this user and slide its idle expiry forward.
    /// Expiry found here is persisted as a revocation before the error is returned.
    async fn validate_and_renew(
        &self,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<Session, SessionError>;

    /// Revoke a session. Repeated calls are no-ops and never change the recorded reason.
    async fn revoke(&self, session_id: Uuid, reason: RevocationReason)
    -> Result<(), SessionError>;
}

/// Implementation of SessionManager
pub struct SessionManagerImpl {
    session_repository: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
    idle_window: Duration,
    absolute_window: Duration,
}

impl SessionManagerImpl {
    pub fn new(
        session_repository: Arc<dyn SessionRepository>,
        clock: Arc<dyn Clock>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            session_repository,
            clock,
            idle_window: config.session_idle_window,
            absolute_window: config.session_absolute_window,
        }
    }

    async fn expire(&self, session: &Session, reason: RevocationReason) -> Result<(), SessionError> {
        let revoked = self
            .session_repository
            .revoke(session.id, reason, self.clock.now())
            .await?;

        if revoked {
            tracing::info!(
                session_id = %session.id,
                user_id = %session.user_id,
                reason = %reason,
                "session expired"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl SessionManager for SessionManagerImpl {
    async fn create(&self, user_id: Uuid, client: ClientInfo) -> Result<Session, SessionError> {
        let now = self.clock.now();

        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            created_at: now,
            last_activity_at: now,
            idle_expires_at: now + self.idle_window,
            absolute_expires_at: now + self.absolute_window,
            revoked: false,
            revoked_reason: None,
            revoked_at: None,
            ip_address: client.ip_address,
            user_agent: client.user_agent,
        };

        let session = self.session_repository.create(session).await?;
        tracing::debug!(session_id = %session.id, user_id = %user_id, "session created");

        Ok(session)
    }

    async fn validate_and_renew(
        &self,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<Session, SessionError> {
        let session = self
            .session_repository
            .find_by_id(session_id)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or(SessionError::NotFound)?;

        if session.revoked {
            let reason = session
                .revoked_reason
                .unwrap_or(RevocationReason::Logout);
            return Err(SessionError::Revoked(reason));
        }

        let now = self.clock.now();

        if now >= session.idle_expires_at {
            self.expire(&session, RevocationReason::IdleTimeout).await?;
            return Err(SessionError::IdleTimeout);
        }

        if now >= session.absolute_expires_at {
            self.expire(&session, RevocationReason::AbsoluteTimeout)
                .await?;
            return Err(SessionError::Expired);
        }

        // Another request may have revoked it between the read and this write
        match self
            .session_repository
            .touch(session_id, now, now + self.idle_window)
            .await?
        {
            Some(renewed) => Ok(renewed),
            None => {
                let reason = self
                    .session_repository
                    .find_by_id(session_id)
                    .await?
                    .and_then(|s| s.revoked_reason)
                    .unwrap_or(RevocationReason::Logout);
                Err(SessionError::Revoked(reason))
            }
        }
    }

    async fn revoke(
        &self,
        session_id: Uuid,
        reason: RevocationReason,
    ) -> Result<(), SessionError> {
        let revoked = self
            .session_repository
            .revoke(session_id, reason, self.clock.now())
            .await?;

        if revoked {
            tracing::info!(session_id = %session_id, reason = %reason, "session revoked");
        }
        Ok(())
    }
}
