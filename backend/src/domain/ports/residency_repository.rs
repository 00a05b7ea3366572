//! Driven port for residency storage.
//!
//! Listings are append-only: adapters insert, list and look up, nothing
//! else. The identifier is assigned by the adapter on insert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewResidency, Residency, ResidencyId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by residency repository adapters.
    pub enum ResidencyRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "residency repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "residency repository query failed: {message}",
        /// A uniqueness constraint rejected the insert.
        Duplicate { message: String } =>
            "residency already exists: {message}",
    }
}

/// Port for residency persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResidencyRepository: Send + Sync {
    /// Store a validated listing stamped with `created_at`, returning the
    /// record with its assigned identifier.
    async fn insert(
        &self,
        residency: &NewResidency,
        created_at: DateTime<Utc>,
    ) -> Result<Residency, ResidencyRepositoryError>;

    /// Every listing, newest first.
    async fn list_newest_first(&self) -> Result<Vec<Residency>, ResidencyRepositoryError>;

    /// Look up a single listing.
    async fn find_by_id(
        &self,
        id: &ResidencyId,
    ) -> Result<Option<Residency>, ResidencyRepositoryError>;

    /// Number of stored listings.
    async fn count(&self) -> Result<u64, ResidencyRepositoryError>;
}
