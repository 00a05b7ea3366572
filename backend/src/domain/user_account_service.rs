//! User account domain service.
//!
//! Every mutation starts with an ensure step so a first-time caller gets a
//! stub record before anything else touches their bookings or favourites.
//! Conflicts are decided by the repository's conditional writes, never by a
//! read made beforehand.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{UserCommand, UserQuery, UserRepository, UserRepositoryError};
use crate::domain::{
    Booking, EmailAddress, EnsuredUser, Error, FavouriteToggle, ProfileUpdate, ResidencyId, User,
};

pub(crate) fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

/// Account, booking and favourite service implementing the user ports.
#[derive(Clone)]
pub struct UserAccountService<U> {
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U> UserAccountService<U> {
    /// Create a new service over the user repository.
    pub fn new(users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }
}

impl<U> UserAccountService<U>
where
    U: UserRepository,
{
    async fn ensure(&self, email: &EmailAddress) -> Result<EnsuredUser, Error> {
        let ensured = self
            .users
            .ensure(email)
            .await
            .map_err(map_user_repository_error)?;
        if ensured.created {
            info!(%email, "user provisioned");
        }
        Ok(ensured)
    }
}

#[async_trait]
impl<U> UserCommand for UserAccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, email: &EmailAddress) -> Result<EnsuredUser, Error> {
        self.ensure(email).await
    }

    async fn book_visit(
        &self,
        email: &EmailAddress,
        residency_id: ResidencyId,
        date: Option<NaiveDate>,
    ) -> Result<Booking, Error> {
        self.ensure(email).await?;
        let booking = Booking {
            residency_id,
            date: date.unwrap_or_else(|| self.clock.utc().date_naive()),
        };
        let inserted = self
            .users
            .insert_booking(email, &booking)
            .await
            .map_err(map_user_repository_error)?;
        if !inserted {
            return Err(Error::conflict("Already booked").with_details(json!({
                "residencyId": residency_id,
                "code": "already_booked",
            })));
        }
        info!(%email, %residency_id, date = %booking.date, "visit booked");
        Ok(booking)
    }

    async fn cancel_booking(
        &self,
        email: &EmailAddress,
        residency_id: &ResidencyId,
    ) -> Result<(), Error> {
        self.ensure(email).await?;
        let removed = self
            .users
            .delete_booking(email, residency_id)
            .await
            .map_err(map_user_repository_error)?;
        if !removed {
            return Err(Error::not_found("Not booked").with_details(json!({
                "residencyId": residency_id,
                "code": "not_booked",
            })));
        }
        info!(%email, %residency_id, "visit cancelled");
        Ok(())
    }

    async fn toggle_favourite(
        &self,
        email: &EmailAddress,
        residency_id: &ResidencyId,
    ) -> Result<FavouriteToggle, Error> {
        self.ensure(email).await?;
        let toggle = self
            .users
            .toggle_favourite(email, residency_id)
            .await
            .map_err(map_user_repository_error)?;
        debug!(%email, %residency_id, added = toggle.added, "favourite toggled");
        Ok(toggle)
    }

    async fn get_profile(&self, email: &EmailAddress) -> Result<User, Error> {
        Ok(self.ensure(email).await?.user)
    }

    async fn update_profile(
        &self,
        email: &EmailAddress,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let ensured = self.ensure(email).await?;
        let update = update.normalised();
        if update.is_empty() {
            return Ok(ensured.user);
        }
        self.users
            .update_profile(email, &update)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::internal(format!("user {email} vanished during update")))
    }
}

#[async_trait]
impl<U> UserQuery for UserAccountService<U>
where
    U: UserRepository,
{
    async fn list_bookings(&self, email: &EmailAddress) -> Result<Vec<Booking>, Error> {
        self.users
            .list_bookings(email)
            .await
            .map_err(map_user_repository_error)
    }

    async fn list_favourites(&self, email: &EmailAddress) -> Result<BTreeSet<ResidencyId>, Error> {
        self.users
            .list_favourites(email)
            .await
            .map_err(map_user_repository_error)
    }
}

#[cfg(test)]
#[path = "user_account_service_tests.rs"]
mod tests;
