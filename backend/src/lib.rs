//! Dental clinic booking backend.
//!
//! Hexagonal layout: `domain` holds the booking, dentist, and credential
//! rules behind ports; `inbound::http` adapts them to the REST API;
//! `outbound` provides PostgreSQL, in-memory, and credential adapters;
//! `server` wires the pieces into an Actix application.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
