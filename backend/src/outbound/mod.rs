//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel
//! - **memory**: process-local store used without a database and in tests
//! - **avatar**: identicon rendering and filesystem storage
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no account or reply rules.

pub mod avatar;
pub mod memory;
pub mod persistence;
