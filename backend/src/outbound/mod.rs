//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM.
//! - **memory**: mutex-guarded in-process store for tests.
//!
//! Adapters translate between domain types and storage representations and
//! contain no business logic.

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod persistence;
