//! Session token configuration parsing and validation.
//!
//! Centralises the environment-driven JWT settings so they are validated
//! consistently and can be tested in isolation with `mockable::MockEnv`.

use mockable::Env;
use tracing::warn;
use zeroize::Zeroizing;

const SECRET_ENV: &str = "JWT_SECRET";
const EXPIRE_DAYS_ENV: &str = "JWT_EXPIRE_DAYS";
const COOKIE_EXPIRE_DAYS_ENV: &str = "JWT_COOKIE_EXPIRE_DAYS";
const SECRET_MIN_LEN: usize = 32;
const DEFAULT_EXPIRE_DAYS: u32 = 30;
const MAX_EXPIRE_DAYS: u32 = 3650;
const DAYS_EXPECTED: &str = "a whole number of days between 1 and 3650";

/// Build mode for token configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings.
    Debug,
    /// Release builds require an explicit, strong signing secret.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use clinic_backend::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated token settings.
pub struct TokenSettings {
    /// HMAC secret used to sign session tokens.
    pub secret: Zeroizing<Vec<u8>>,
    /// Lifetime of an issued token in days.
    pub token_lifetime_days: u32,
    /// Lifetime of the `token` cookie in days.
    pub cookie_lifetime_days: u32,
    /// Whether the `token` cookie is marked `Secure`.
    pub cookie_secure: bool,
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("token_lifetime_days", &self.token_lifetime_days)
            .field("cookie_lifetime_days", &self.cookie_lifetime_days)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

/// Errors raised while validating token configuration.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TokenConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The signing secret is too short for release builds.
    #[error("JWT_SECRET too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort { length: usize, min_len: usize },
}

/// Build token settings from environment variables.
///
/// `production` controls the cookie `Secure` flag.
///
/// # Examples
///
/// ```rust
/// use clinic_backend::inbound::http::session_config::{BuildMode, token_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "JWT_SECRET" => Some("0123456789abcdef0123456789abcdef".to_owned()),
///     "JWT_EXPIRE_DAYS" => Some("7".to_owned()),
///     _ => None,
/// });
///
/// let settings = token_settings_from_env(&env, BuildMode::Release, true).expect("valid");
/// assert_eq!(settings.token_lifetime_days, 7);
/// assert_eq!(settings.cookie_lifetime_days, 30);
/// assert!(settings.cookie_secure);
/// ```
pub fn token_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    production: bool,
) -> Result<TokenSettings, TokenConfigError> {
    Ok(TokenSettings {
        secret: secret_from_env(env, mode)?,
        token_lifetime_days: days_from_env(env, EXPIRE_DAYS_ENV, mode)?,
        cookie_lifetime_days: days_from_env(env, COOKIE_EXPIRE_DAYS_ENV, mode)?,
        cookie_secure: production,
    })
}

fn secret_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Zeroizing<Vec<u8>>, TokenConfigError> {
    match env.string(SECRET_ENV).map(|value| Zeroizing::new(value.into_bytes())) {
        Some(secret) if secret.len() >= SECRET_MIN_LEN => Ok(secret),
        Some(secret) => {
            if mode.is_debug() && !secret.is_empty() {
                warn!(length = secret.len(), "JWT_SECRET is short; accepted in debug builds only");
                Ok(secret)
            } else {
                Err(TokenConfigError::SecretTooShort {
                    length: secret.len(),
                    min_len: SECRET_MIN_LEN,
                })
            }
        }
        None => {
            if mode.is_debug() {
                warn!("JWT_SECRET not set; using an ephemeral secret (dev only)");
                Ok(Zeroizing::new(rand::random::<[u8; SECRET_MIN_LEN]>().to_vec()))
            } else {
                Err(TokenConfigError::MissingEnv { name: SECRET_ENV })
            }
        }
    }
}

fn days_from_env<E: Env>(
    env: &E,
    name: &'static str,
    mode: BuildMode,
) -> Result<u32, TokenConfigError> {
    let Some(value) = env.string(name) else {
        return Ok(DEFAULT_EXPIRE_DAYS);
    };
    match value.trim().parse::<u32>() {
        Ok(days) if (1..=MAX_EXPIRE_DAYS).contains(&days) => Ok(days),
        _ if mode.is_debug() => {
            warn!(%value, variable = name, "invalid day count; using default");
            Ok(DEFAULT_EXPIRE_DAYS)
        }
        _ => Err(TokenConfigError::InvalidEnv {
            name,
            value,
            expected: DAYS_EXPECTED,
        }),
    }
}
