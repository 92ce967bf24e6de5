//! HTTP inbound adapter exposing the clinic's REST endpoints.

pub mod auth;
pub mod bookings;
pub mod dentists;
pub mod envelope;
pub mod error;
pub mod health;
pub mod identity;
pub mod routes;
pub mod schemas;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub(crate) mod validation;

pub use error::ApiResult;
