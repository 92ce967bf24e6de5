//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between the private row structs in `models` and
//! domain records; schema invariants such as the one-booking cap live in the
//! migrations and surface here as typed port errors.
//!
//! # Example
//!
//! ```no_run
//! use clinic_backend::outbound::persistence::{
//!     DbPool, DieselBookingRepository, PoolConfig, run_migrations,
//! };
//!
//! # async fn connect() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://clinic@localhost/clinic";
//! run_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let bookings = DieselBookingRepository::new(pool);
//! # let _ = bookings;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_booking_repository;
mod diesel_dentist_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_dentist_repository::DieselDentistRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
