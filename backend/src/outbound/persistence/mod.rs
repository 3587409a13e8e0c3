//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the forum's driven ports
//! backed by PostgreSQL via Diesel with async support through `diesel-async`
//! and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. Account rules live in the domain.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **Unique constraints as errors**: Violations of `users_passport_key` and
//!   `users_nickname_key` surface as `PassportTaken` / `NicknameTaken`.
//!
//! # Example
//!
//! ```ignore
//! use focus::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/focus")).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_forum_repository;
mod diesel_user_repository;
mod diesel_user_unit_of_work;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_forum_repository::DieselForumRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_user_unit_of_work::DieselUserUnitOfWork;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
