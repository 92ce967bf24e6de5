//! Inbound adapters translating HTTP requests into domain service calls while
//! keeping framework details at the edge.

pub mod http;
