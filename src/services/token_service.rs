//! Signed bearer tokens binding a user to one session.
//!
//! A token is only ever a necessary condition for access: it carries no
//! session state, so a valid token whose session is revoked is still refused
//! further up.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    sid: String, // session_id
    iat: i64,
    exp: i64,
}

/// Token codec errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token")]
    Invalid,

    #[error("Token expired")]
    Expired,

    #[error("Token generation failed: {0}")]
    Encoding(String),
}

/// A freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Identity carried by a verified token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub session_id: Uuid,
}

/// HS256 signer and verifier. Consults no store.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            clock,
        }
    }

    /// Sign a token for the given user and session, valid for the configured lifetime
    pub fn issue(&self, user_id: Uuid, session_id: Uuid) -> Result<IssuedToken, TokenError> {
        let issued_at = self.clock.now();
        let expires_at = issued_at + self.ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            sid: session_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature and expiry, returning the user and session the token names
    pub fn verify(&self, token: &str) -> Result<TokenSubject, TokenError> {
        // Expiry is checked against the injected clock, not the library's
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| TokenError::Invalid)?;
        let claims = token_data.claims;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Invalid)?;
        let session_id = Uuid::parse_str(&claims.sid).map_err(|_| TokenError::Invalid)?;

        Ok(TokenSubject {
            user_id,
            session_id,
        })
    }
}
