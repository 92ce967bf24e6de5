//! HMAC-SHA256 JWT implementation of the [`SessionTokens`] port.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{SessionTokenError, SessionTokens};
use crate::domain::{SessionToken, UserId};

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user id.
    pub sub: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Signs and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct JwtSessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtSessionTokens {
    /// Create an issuer whose tokens expire `lifetime` after issue.
    pub fn new(secret: &[u8], lifetime: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            lifetime,
            clock,
        }
    }
}

impl SessionTokens for JwtSessionTokens {
    fn issue(&self, user: &UserId) -> Result<SessionToken, SessionTokenError> {
        let now = self.clock.utc();
        let expires = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| SessionTokenError::issue("token expiry is out of range"))?;
        let claims = SessionClaims {
            sub: user.to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map(SessionToken::new)
            .map_err(|err| SessionTokenError::issue(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, SessionTokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| SessionTokenError::invalid(err.to_string()))?;
        UserId::new(&data.claims.sub).map_err(|err| SessionTokenError::invalid(err.to_string()))
    }
}
