use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::sync::Arc;

use crate::config::CookieConfig;
use crate::handlers::{ErrorResponse, validate_request};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::auth::{AuthResponse, LoginRequest, MessageResponse};
use crate::models::session::ClientInfo;
use crate::models::user::{CreateUserRequest, UpdateProfileRequest, User};
use crate::services::auth_service::{AuthError, AuthService};
use crate::services::authenticator::{SESSION_COOKIE, extract_token};

/// Attributes of the `session_token` cookie
#[derive(Debug, Clone, Copy)]
pub struct SessionCookie {
    pub config: CookieConfig,
    /// Matches the absolute session window
    pub max_age: chrono::Duration,
}

impl SessionCookie {
    pub fn new(config: CookieConfig, max_age: chrono::Duration) -> Self {
        Self { config, max_age }
    }

    fn issue(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .http_only(true)
            .secure(self.config.secure)
            .same_site(self.config.same_site)
            .path("/")
            .max_age(time::Duration::seconds(self.max_age.num_seconds()))
            .build()
    }

    /// Expired, empty cookie. Emitted even when the request carried none.
    fn removal(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .http_only(true)
            .secure(self.config.secure)
            .same_site(self.config.same_site)
            .path("/")
            .max_age(time::Duration::ZERO)
            .expires(time::OffsetDateTime::UNIX_EPOCH)
            .build()
    }
}

/// Informational client metadata taken from request headers
fn client_info(headers: &HeaderMap) -> ClientInfo {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let ip_address = header_str("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .or_else(|| header_str("x-real-ip"))
        .map(str::to_string);

    ClientInfo {
        ip_address,
        user_agent: header_str(header::USER_AGENT.as_str()).map(str::to_string),
    }
}

/// Convert AuthError to HTTP response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AuthError::DuplicateEmail => (
                StatusCode::CONFLICT,
                "duplicate_email",
                "Email already exists".to_string(),
            ),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password".to_string(),
            ),
            AuthError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "Authentication required".to_string(),
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid or expired authentication token".to_string(),
            ),
            AuthError::SessionNotFound => (
                StatusCode::UNAUTHORIZED,
                "session_not_found",
                "Session not found".to_string(),
            ),
            AuthError::SessionRevoked(reason) => (
                StatusCode::UNAUTHORIZED,
                "session_revoked",
                format!("Session has been revoked ({})", reason),
            ),
            AuthError::SessionIdleTimeout => (
                StatusCode::UNAUTHORIZED,
                "session_idle_timeout",
                "Session expired due to inactivity".to_string(),
            ),
            AuthError::SessionExpired => (
                StatusCode::UNAUTHORIZED,
                "session_expired",
                "Session has expired, please log in again".to_string(),
            ),
            AuthError::DatabaseError(msg) => {
                tracing::error!(error = %msg, "auth request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Internal server error".to_string(),
                )
            }
        };

        let error_response = ErrorResponse::new(error_type, &message);
        (status, Json(error_response)).into_response()
    }
}

/// Handler for user registration
///
/// Creates a new user account with default categories and logs it in.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User successfully registered", body = AuthResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    State(session_cookie): State<SessionCookie>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), Response> {
    validate_request(&request)?;

    match auth_service.register(request, client_info(&headers)).await {
        Ok(response) => {
            let jar = jar.add(session_cookie.issue(response.token.clone()));
            Ok((StatusCode::CREATED, jar, Json(response)))
        }
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for user login
///
/// Authenticates a user, opens a new session and returns its token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    State(session_cookie): State<SessionCookie>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), Response> {
    match auth_service.login(request, client_info(&headers)).await {
        Ok(response) => {
            let jar = jar.add(session_cookie.issue(response.token.clone()));
            Ok((jar, Json(response)))
        }
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for logout
///
/// Revokes the presented session, if any, and clears the cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn logout_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    State(session_cookie): State<SessionCookie>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<MessageResponse>), Response> {
    let token = extract_token(&headers);

    match auth_service.logout(token.as_deref()).await {
        Ok(()) => Ok((
            jar.add(session_cookie.removal()),
            Json(MessageResponse::new("Logged out successfully")),
        )),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for the current user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me_handler(Extension(auth_user): Extension<AuthenticatedUser>) -> Json<User> {
    Json(auth_user.user)
}

/// Handler for profile updates
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn update_profile_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<User>, Response> {
    validate_request(&request)?;

    match auth_service
        .update_profile(auth_user.user.id, request)
        .await
    {
        Ok(user) => Ok(Json(user)),
        Err(e) => Err(e.into_response()),
    }
}
