pub mod auth_handlers;
pub mod category_handlers;
pub mod currency_handlers;
pub mod report_handlers;
pub mod transaction_handlers;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

/// Error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

/// Run `validator` rules on a request body, turning failures into a 400 response
pub fn validate_request<T: Validate>(request: &T) -> Result<(), Response> {
    request
        .validate()
        .map_err(|errors| validation_error_response(&errors))
}

fn validation_error_response(validation_errors: &ValidationErrors) -> Response {
    let error_message = validation_errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ");

    let error_response = ErrorResponse::new("validation_error", &error_message);
    (StatusCode::BAD_REQUEST, Json(error_response)).into_response()
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use crate::middleware::auth_middleware::AuthenticatedUser;
    use crate::models::session::Session;
    use crate::models::user::{ProfileType, User};

    /// A caller as the auth middleware would attach it
    pub fn authenticated_user() -> AuthenticatedUser {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: String::new(),
            profile_type: ProfileType::Salaried,
            preferred_currency: "USD".to_string(),
            created_at: now,
        };
        let session = Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            created_at: now,
            last_activity_at: now,
            idle_expires_at: now + Duration::minutes(120),
            absolute_expires_at: now + Duration::hours(24),
            revoked: false,
            revoked_reason: None,
            revoked_at: None,
            ip_address: None,
            user_agent: None,
        };
        AuthenticatedUser { user, session }
    }
}
