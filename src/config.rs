use axum_extra::extract::cookie::SameSite;
use chrono::Duration;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Default access-token lifetime in minutes
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 15;
/// Default sliding idle window in minutes
pub const DEFAULT_SESSION_IDLE_MINUTES: i64 = 120;
/// Default absolute session lifetime in hours
pub const DEFAULT_SESSION_ABSOLUTE_HOURS: i64 = 24;

/// Inclusive bounds accepted for each window
const ACCESS_TOKEN_TTL_MINUTES_RANGE: RangeInclusive<i64> = 1..=7 * 24 * 60;
const SESSION_IDLE_MINUTES_RANGE: RangeInclusive<i64> = 1..=30 * 24 * 60;
const SESSION_ABSOLUTE_HOURS_RANGE: RangeInclusive<i64> = 1..=366 * 24;

/// bcrypt accepts costs 4 through 31
pub const BCRYPT_MIN_COST: u32 = 4;
pub const BCRYPT_MAX_COST: u32 = 31;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Token and session timing, plus the signing secret
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub session_idle_window: Duration,
    pub session_absolute_window: Duration,
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    /// Defaults for every window, with the given secret
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_ttl: Duration::minutes(DEFAULT_ACCESS_TOKEN_TTL_MINUTES),
            session_idle_window: Duration::minutes(DEFAULT_SESSION_IDLE_MINUTES),
            session_absolute_window: Duration::hours(DEFAULT_SESSION_ABSOLUTE_HOURS),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Attributes of the `session_token` cookie
#[derive(Debug, Clone, Copy)]
pub struct CookieConfig {
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Postgres connection string. The in-memory store is used when unset.
    pub database_url: Option<String>,
    pub cors_origins: Vec<String>,
    pub auth: AuthConfig,
    pub cookie: CookieConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                    | Default                  |
    /// |----------------------------|--------------------------|
    /// | `JWT_SECRET`               | required                 |
    /// | `ACCESS_TOKEN_TTL_MINUTES` | `15`                     |
    /// | `SESSION_IDLE_MINUTES`     | `120`                    |
    /// | `SESSION_ABSOLUTE_HOURS`   | `24`                     |
    /// | `BCRYPT_COST`              | `12`                     |
    /// | `COOKIE_SECURE`            | `false`                  |
    /// | `COOKIE_SAMESITE`          | `lax`                    |
    /// | `CORS_ORIGINS`             | `http://localhost:3000`  |
    /// | `HOST`                     | `127.0.0.1`              |
    /// | `PORT`                     | `8080`                   |
    /// | `DATABASE_URL`             | unset (in-memory store)  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let access_minutes = parse_in_range(
            &lookup,
            "ACCESS_TOKEN_TTL_MINUTES",
            DEFAULT_ACCESS_TOKEN_TTL_MINUTES,
            ACCESS_TOKEN_TTL_MINUTES_RANGE,
        )?;
        let idle_minutes = parse_in_range(
            &lookup,
            "SESSION_IDLE_MINUTES",
            DEFAULT_SESSION_IDLE_MINUTES,
            SESSION_IDLE_MINUTES_RANGE,
        )?;
        let absolute_hours = parse_in_range(
            &lookup,
            "SESSION_ABSOLUTE_HOURS",
            DEFAULT_SESSION_ABSOLUTE_HOURS,
            SESSION_ABSOLUTE_HOURS_RANGE,
        )?;
        let bcrypt_cost = parse_in_range(
            &lookup,
            "BCRYPT_COST",
            bcrypt::DEFAULT_COST,
            BCRYPT_MIN_COST..=BCRYPT_MAX_COST,
        )?;

        let secure = lookup("COOKIE_SECURE")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let same_site = lookup("COOKIE_SAMESITE")
            .map(|v| parse_same_site(&v))
            .unwrap_or(SameSite::Lax);

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        // Credentialed CORS cannot use a wildcard origin
        if let Some(wildcard) = cors_origins.iter().find(|origin| origin.as_str() == "*") {
            return Err(ConfigError::Invalid {
                name: "CORS_ORIGINS",
                value: wildcard.clone(),
            });
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080u16)?,
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            cors_origins,
            auth: AuthConfig {
                jwt_secret,
                access_token_ttl: window(
                    "ACCESS_TOKEN_TTL_MINUTES",
                    access_minutes,
                    Duration::try_minutes,
                )?,
                session_idle_window: window(
                    "SESSION_IDLE_MINUTES",
                    idle_minutes,
                    Duration::try_minutes,
                )?,
                session_absolute_window: window(
                    "SESSION_ABSOLUTE_HOURS",
                    absolute_hours,
                    Duration::try_hours,
                )?,
                bcrypt_cost,
            },
            cookie: CookieConfig { secure, same_site },
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn parse_in_range<F, T>(
    lookup: &F,
    name: &'static str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Display,
{
    let value = parse_or(lookup, name, default)?;
    if !range.contains(&value) {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn window(
    name: &'static str,
    amount: i64,
    to_duration: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    to_duration(amount).ok_or(ConfigError::Invalid {
        name,
        value: amount.to_string(),
    })
}

/// Unknown values fall back to `Lax`
fn parse_same_site(value: &str) -> SameSite {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}
