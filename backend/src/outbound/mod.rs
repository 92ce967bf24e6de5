//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel.
//! - **memory**: process-local repositories for development and tests.
//! - **security**: Argon2 password hashing and signed JWT session tokens.
//!
//! Adapters translate between domain types and infrastructure
//! representations; booking and ownership rules stay in the domain.

pub mod memory;
pub mod persistence;
pub mod security;
