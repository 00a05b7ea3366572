//! Driven port for user, booking and favourite storage.
//!
//! Every mutating method must be a single conditional statement in the
//! backing store (insert-if-absent, delete-if-present). Adapters never read
//! and then write, so concurrent duplicate requests cannot both succeed.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{
    Booking, EmailAddress, EnsuredUser, FavouriteToggle, ProfileUpdate, ResidencyId, User,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
    }
}

/// Port for user persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a stub user when absent, then return the stored record.
    async fn ensure(&self, email: &EmailAddress) -> Result<EnsuredUser, UserRepositoryError>;

    /// Fetch a user with their bookings and favourites.
    async fn find(&self, email: &EmailAddress) -> Result<Option<User>, UserRepositoryError>;

    /// Overwrite only the provided profile fields. Returns `None` when the
    /// user does not exist.
    async fn update_profile(
        &self,
        email: &EmailAddress,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Add a booking unless one already exists for the residency. Returns
    /// `false` when nothing was inserted.
    async fn insert_booking(
        &self,
        email: &EmailAddress,
        booking: &Booking,
    ) -> Result<bool, UserRepositoryError>;

    /// Remove the booking for a residency. Returns `false` when there was
    /// none.
    async fn delete_booking(
        &self,
        email: &EmailAddress,
        residency_id: &ResidencyId,
    ) -> Result<bool, UserRepositoryError>;

    /// Bookings in the order they were made.
    async fn list_bookings(&self, email: &EmailAddress)
    -> Result<Vec<Booking>, UserRepositoryError>;

    /// Flip favourite membership and report the resulting set.
    async fn toggle_favourite(
        &self,
        email: &EmailAddress,
        residency_id: &ResidencyId,
    ) -> Result<FavouriteToggle, UserRepositoryError>;

    /// Current favourites.
    async fn list_favourites(
        &self,
        email: &EmailAddress,
    ) -> Result<BTreeSet<ResidencyId>, UserRepositoryError>;
}
