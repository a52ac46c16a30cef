use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Why a session stopped being live
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Type)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RevocationReason {
    Logout,
    IdleTimeout,
    AbsoluteTimeout,
}

impl RevocationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevocationReason::Logout => "logout",
            RevocationReason::IdleTimeout => "idle_timeout",
            RevocationReason::AbsoluteTimeout => "absolute_timeout",
        }
    }
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informational request metadata recorded on a session. Never enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// One authenticated login.
///
/// `idle_expires_at` slides forward on every authenticated request,
/// `absolute_expires_at` is fixed at creation. A revoked session is never
/// un-revoked and the record is kept for audit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub idle_expires_at: DateTime<Utc>,
    pub absolute_expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_reason: Option<RevocationReason>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
