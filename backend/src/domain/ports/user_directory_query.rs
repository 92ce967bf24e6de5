//! Driving port for admin user listings.

use async_trait::async_trait;

use crate::domain::{Error, UserId, UserWithBookings};

/// Domain use-case port for reading accounts with their bookings joined in.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectoryQuery: Send + Sync {
    /// Every account with its bookings.
    async fn list_users(&self) -> Result<Vec<UserWithBookings>, Error>;

    /// One account with its bookings.
    async fn get_user(&self, id: &UserId) -> Result<UserWithBookings, Error>;
}
