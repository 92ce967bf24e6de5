//! Credential adapters: argon2 password hashing and HMAC-signed JWTs.

mod argon2_hasher;
mod jwt_tokens;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt_tokens::{JwtSessionTokens, SessionClaims};
