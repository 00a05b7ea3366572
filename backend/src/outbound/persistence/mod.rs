//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the repository ports backed by PostgreSQL via
//! `diesel-async` with `bb8` pooling.
//!
//! - Repositories only translate between row structs and domain types.
//! - Row models (`models.rs`) and table definitions (`schema.rs`) stay
//!   private to this module.
//! - Every Diesel and pool error is mapped into the owning port's error type.
//!
//! # Example
//!
//! ```no_run
//! use rental_backend::outbound::persistence::{
//!     DbPool, DieselResidencyRepository, PoolConfig, run_migrations,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://localhost/rental";
//! run_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let residencies = DieselResidencyRepository::new(pool);
//! # let _ = residencies;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_residency_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_residency_repository::DieselResidencyRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
