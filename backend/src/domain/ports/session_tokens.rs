//! Port for signed, time-limited session tokens.

use crate::domain::{SessionToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session token adapters.
    pub enum SessionTokenError {
        /// The token could not be signed.
        Issue { message: String } => "session token could not be issued: {message}",
        /// The token is malformed, tampered with, or expired.
        Invalid { message: String } => "session token rejected: {message}",
    }
}

/// Issues and verifies session tokens that embed a user id.
///
/// Verification is offline: it checks the signature and expiry only, so
/// callers re-fetch the user when the account may have changed.
#[cfg_attr(test, mockall::automock)]
pub trait SessionTokens: Send + Sync {
    /// Sign a token for `user`.
    fn issue(&self, user: &UserId) -> Result<SessionToken, SessionTokenError>;

    /// Recover the user id from a presented token.
    fn verify(&self, token: &str) -> Result<UserId, SessionTokenError>;
}
