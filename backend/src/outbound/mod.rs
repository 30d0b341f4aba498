//! Outbound adapters implementing the storage ports.
//!
//! - **memory**: process-local maps, used for development and tests
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **remote**: reqwest proxy to an upstream capacity service
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod persistence;
pub mod remote;
