use async_trait::async_trait;
use bcrypt::{hash, verify};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::auth::{AuthResponse, LoginRequest};
use crate::models::session::{ClientInfo, RevocationReason, Session};
use crate::models::user::{CreateUserRequest, UpdateProfileRequest, User};
use crate::repositories::RepositoryError;
use crate::repositories::user_repository::UserRepository;
use crate::services::category_service::{CategoryError, CategoryService};
use crate::services::session_service::{SessionError, SessionManager};
use crate::services::token_service::{TokenCodec, TokenError};

const DEFAULT_CURRENCY: &str = "USD";

/// Authentication service errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Session has been revoked ({0})")]
    SessionRevoked(RevocationReason),

    #[error("Session expired due to inactivity")]
    SessionIdleTimeout,

    #[error("Session has expired")]
    SessionExpired,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<SessionError> for AuthError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound => AuthError::SessionNotFound,
            SessionError::Revoked(reason) => AuthError::SessionRevoked(reason),
            SessionError::IdleTimeout => AuthError::SessionIdleTimeout,
            SessionError::Expired => AuthError::SessionExpired,
            SessionError::DatabaseError(msg) => AuthError::DatabaseError(msg),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid | TokenError::Expired => AuthError::InvalidToken,
            TokenError::Encoding(msg) => AuthError::DatabaseError(msg),
        }
    }
}

/// Trait defining authentication service operations
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user, seed their categories and open a session
    async fn register(
        &self,
        request: CreateUserRequest,
        client: ClientInfo,
    ) -> Result<AuthResponse, AuthError>;

    /// Check credentials and open a new session
    async fn login(
        &self,
        request: LoginRequest,
        client: ClientInfo,
    ) -> Result<AuthResponse, AuthError>;

    /// Revoke the session named by a token, if the token verifies.
    /// Unverifiable or missing tokens are ignored.
    async fn logout(&self, token: Option<&str>) -> Result<(), AuthError>;

    /// Update the profile of an existing user
    async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<User, AuthError>;
}

/// Implementation of AuthService
pub struct AuthServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    category_service: Arc<dyn CategoryService>,
    session_manager: Arc<dyn SessionManager>,
    token_codec: Arc<TokenCodec>,
    bcrypt_cost: u32,
}

impl AuthServiceImpl {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        category_service: Arc<dyn CategoryService>,
        session_manager: Arc<dyn SessionManager>,
        token_codec: Arc<TokenCodec>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            user_repository,
            category_service,
            session_manager,
            token_codec,
            bcrypt_cost,
        }
    }

    /// Hash a password using bcrypt
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        hash(password, self.bcrypt_cost)
            .map_err(|e| AuthError::DatabaseError(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a hash
    fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        verify(password, hash)
            .map_err(|e| AuthError::DatabaseError(format!("Password verification failed: {}", e)))
    }

    /// Open a session for the user and sign a token bound to it
    async fn start_session(
        &self,
        user: User,
        client: ClientInfo,
    ) -> Result<AuthResponse, AuthError> {
        let session: Session = self.session_manager.create(user.id, client).await?;
        let issued = self.token_codec.issue(user.id, session.id)?;

        Ok(AuthResponse {
            user,
            token: issued.token,
            token_expires_at: issued.expires_at,
            session_expires_at: session.absolute_expires_at,
        })
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(
        &self,
        request: CreateUserRequest,
        client: ClientInfo,
    ) -> Result<AuthResponse, AuthError> {
        let password_hash = self.hash_password(&request.password)?;

        let user = User {
            id: Uuid::new_v4(),
            name: request.name,
            email: request.email,
            password_hash,
            profile_type: request.profile_type.unwrap_or_default(),
            preferred_currency: request
                .preferred_currency
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            created_at: Utc::now(),
        };

        let user = self
            .user_repository
            .create(user)
            .await
            .map_err(|e| match e {
                RepositoryError::ConstraintViolation(_) => AuthError::DuplicateEmail,
                RepositoryError::DatabaseError(msg) => AuthError::DatabaseError(msg),
                RepositoryError::NotFound => {
                    AuthError::DatabaseError("Unexpected error".to_string())
                }
            })?;

        self.category_service
            .seed_defaults(user.id, user.profile_type)
            .await
            .map_err(|e| match e {
                CategoryError::DatabaseError(msg) => AuthError::DatabaseError(msg),
                other => AuthError::DatabaseError(other.to_string()),
            })?;

        tracing::info!(user_id = %user.id, profile_type = ?user.profile_type, "user registered");
        self.start_session(user, client).await
    }

    async fn login(
        &self,
        request: LoginRequest,
        client: ClientInfo,
    ) -> Result<AuthResponse, AuthError> {
        let user = self
            .user_repository
            .find_by_email(&request.email)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        let is_valid = Self::verify_password(&request.password, &user.password_hash)?;
        if !is_valid {
            tracing::debug!(user_id = %user.id, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        self.start_session(user, client).await
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), AuthError> {
        let Some(subject) = token.and_then(|t| self.token_codec.verify(t).ok()) else {
            return Ok(());
        };

        self.session_manager
            .revoke(subject.session_id, RevocationReason::Logout)
            .await?;
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        mut request: UpdateProfileRequest,
    ) -> Result<User, AuthError> {
        request.preferred_currency = request.preferred_currency.map(|c| c.to_uppercase());

        self.user_repository
            .update_profile(user_id, request)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::Unauthenticated,
                RepositoryError::DatabaseError(msg) => AuthError::DatabaseError(msg),
                RepositoryError::ConstraintViolation(msg) => AuthError::DatabaseError(msg),
            })
    }
}
