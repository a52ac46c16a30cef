use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::services::auth_service::AuthError;
use crate::services::authenticator::Authenticator;

pub use crate::services::authenticator::AuthenticatedUser;

/// Auth middleware that resolves the caller and adds it to request extensions.
/// Every request re-validates the session and renews its idle expiry.
pub async fn auth_middleware(
    State(authenticator): State<Arc<Authenticator>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_user = authenticator.authenticate_headers(&headers).await?;

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
