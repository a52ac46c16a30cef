use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::session::{RevocationReason, Session};
use crate::repositories::RepositoryError;

const SESSION_COLUMNS: &str = "id, user_id, created_at, last_activity_at, idle_expires_at, \
     absolute_expires_at, revoked, revoked_reason, revoked_at, ip_address, user_agent";

/// Trait defining session repository operations.
///
/// Each mutation is a single conditional update so concurrent requests on the
/// same session rely only on per-record atomicity of the store.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session
    async fn create(&self, session: Session) -> Result<Session, RepositoryError>;

    /// Find a session by ID, revoked or not
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, RepositoryError>;

    /// Record activity on a live session. Returns `None` if the session is
    /// missing or already revoked.
    async fn touch(
        &self,
        id: Uuid,
        last_activity_at: DateTime<Utc>,
        idle_expires_at: DateTime<Utc>,
    ) -> Result<Option<Session>, RepositoryError>;

    /// Mark a session revoked. Only the first revocation is recorded; returns
    /// whether this call performed it.
    async fn revoke(
        &self,
        id: Uuid,
        reason: RevocationReason,
        revoked_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;
}

/// PostgreSQL implementation of SessionRepository
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn create(&self, session: Session) -> Result<Session, RepositoryError> {
        let query = format!(
            r#"
            INSERT INTO sessions ({SESSION_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {SESSION_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Session>(&query)
            .bind(session.id)
            .bind(session.user_id)
            .bind(session.created_at)
            .bind(session.last_activity_at)
            .bind(session.idle_expires_at)
            .bind(session.absolute_expires_at)
            .bind(session.revoked)
            .bind(session.revoked_reason)
            .bind(session.revoked_at)
            .bind(&session.ip_address)
            .bind(&session.user_agent)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, RepositoryError> {
        let query = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1");

        let session = sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    async fn touch(
        &self,
        id: Uuid,
        last_activity_at: DateTime<Utc>,
        idle_expires_at: DateTime<Utc>,
    ) -> Result<Option<Session>, RepositoryError> {
        let query = format!(
            r#"
            UPDATE sessions
            SET last_activity_at = $2,
                idle_expires_at = $3
            WHERE id = $1 AND revoked = FALSE
            RETURNING {SESSION_COLUMNS}
            "#
        );

        let session = sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .bind(last_activity_at)
            .bind(idle_expires_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    async fn revoke(
        &self,
        id: Uuid,
        reason: RevocationReason,
        revoked_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET revoked = TRUE,
                revoked_reason = $2,
                revoked_at = $3
            WHERE id = $1 AND revoked = FALSE
            "#,
        )
        .bind(id)
        .bind(reason)
        .bind(revoked_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
