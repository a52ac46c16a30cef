//! Resolves the caller of a protected request.
//!
//! The token is checked first, then the session it names, then the user. The
//! lookup is repeated on every request; nothing is cached between calls.

use axum::http::{HeaderMap, header};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::models::session::Session;
use crate::models::user::User;
use crate::repositories::user_repository::UserRepository;
use crate::services::auth_service::AuthError;
use crate::services::session_service::SessionManager;
use crate::services::token_service::TokenCodec;

/// Name of the cookie carrying the bearer token
pub const SESSION_COOKIE: &str = "session_token";

/// Caller identity attached to authenticated requests
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user: User,
    pub session: Session,
}

/// Candidate token of a request: the session cookie when present and
/// non-empty, otherwise an `Authorization: Bearer` header
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

pub struct Authenticator {
    token_codec: Arc<TokenCodec>,
    session_manager: Arc<dyn SessionManager>,
    user_repository: Arc<dyn UserRepository>,
}

impl Authenticator {
    pub fn new(
        token_codec: Arc<TokenCodec>,
        session_manager: Arc<dyn SessionManager>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            token_codec,
            session_manager,
            user_repository,
        }
    }

    /// Authenticate a request's headers
    pub async fn authenticate_headers(
        &self,
        headers: &HeaderMap,
    ) -> Result<AuthenticatedUser, AuthError> {
        self.authenticate(extract_token(headers).as_deref()).await
    }

    /// Authenticate a candidate token. A live session has its idle expiry renewed.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<AuthenticatedUser, AuthError> {
        let token = token.ok_or(AuthError::Unauthenticated)?;

        let subject = self.token_codec.verify(token)?;

        let session = self
            .session_manager
            .validate_and_renew(subject.session_id, subject.user_id)
            .await
            .map_err(|e| {
                tracing::debug!(
                    user_id = %subject.user_id,
                    session_id = %subject.session_id,
                    error = %e,
                    "session rejected"
                );
                AuthError::from(e)
            })?;

        let user = self
            .user_repository
            .find_by_id(subject.user_id)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::Unauthenticated)?;

        Ok(AuthenticatedUser { user, session })
    }
}
