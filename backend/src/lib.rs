//! Capacity tracker backend library.
//!
//! The binary in `main.rs` wires configuration and a storage backend onto
//! the HTTP routes exposed here.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
