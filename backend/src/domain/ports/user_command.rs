//! Driving port for user mutations.
//!
//! Each operation provisions the user on first contact, so callers never
//! have to register before booking or favouriting.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    Booking, EmailAddress, EnsuredUser, Error, FavouriteToggle, ProfileUpdate, ResidencyId, User,
};

/// Use-case port for account, booking and favourite changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Idempotent get-or-create.
    async fn register(&self, email: &EmailAddress) -> Result<EnsuredUser, Error>;

    /// Book a visit; `date` defaults to today.
    ///
    /// # Errors
    ///
    /// `conflict` ("Already booked") when the user already holds a booking
    /// for the residency. The existing booking is left untouched.
    async fn book_visit(
        &self,
        email: &EmailAddress,
        residency_id: ResidencyId,
        date: Option<NaiveDate>,
    ) -> Result<Booking, Error>;

    /// Cancel a visit.
    ///
    /// # Errors
    ///
    /// `not_found` ("Not booked") when there is nothing to cancel.
    async fn cancel_booking(
        &self,
        email: &EmailAddress,
        residency_id: &ResidencyId,
    ) -> Result<(), Error>;

    /// Add or remove a favourite.
    async fn toggle_favourite(
        &self,
        email: &EmailAddress,
        residency_id: &ResidencyId,
    ) -> Result<FavouriteToggle, Error>;

    /// Load the profile, creating the user record on first access.
    async fn get_profile(&self, email: &EmailAddress) -> Result<User, Error>;

    /// Apply a partial profile edit.
    async fn update_profile(
        &self,
        email: &EmailAddress,
        update: ProfileUpdate,
    ) -> Result<User, Error>;
}

/// Fixture implementation with no memory between calls.
///
/// Every booking succeeds, every cancellation fails with "Not booked", and
/// every toggle adds.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserCommand;

#[async_trait]
impl UserCommand for FixtureUserCommand {
    async fn register(&self, email: &EmailAddress) -> Result<EnsuredUser, Error> {
        Ok(EnsuredUser {
            user: User::stub(email.clone()),
            created: true,
        })
    }

    async fn book_visit(
        &self,
        _email: &EmailAddress,
        residency_id: ResidencyId,
        date: Option<NaiveDate>,
    ) -> Result<Booking, Error> {
        Ok(Booking {
            residency_id,
            date: date.unwrap_or_default(),
        })
    }

    async fn cancel_booking(
        &self,
        _email: &EmailAddress,
        _residency_id: &ResidencyId,
    ) -> Result<(), Error> {
        Err(Error::not_found("Not booked"))
    }

    async fn toggle_favourite(
        &self,
        _email: &EmailAddress,
        residency_id: &ResidencyId,
    ) -> Result<FavouriteToggle, Error> {
        Ok(FavouriteToggle {
            added: true,
            favourites: BTreeSet::from([*residency_id]),
        })
    }

    async fn get_profile(&self, email: &EmailAddress) -> Result<User, Error> {
        Ok(User::stub(email.clone()))
    }

    async fn update_profile(
        &self,
        email: &EmailAddress,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let mut user = User::stub(email.clone());
        update.normalised().apply_to(&mut user);
        Ok(user)
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "test code uses expect for clear failure messages")]
mod tests {
    use super::*;

    fn email() -> EmailAddress {
        EmailAddress::new("a@x.com").expect("valid email")
    }

    #[tokio::test]
    async fn fixture_register_derives_name() {
        let ensured = FixtureUserCommand
            .register(&email())
            .await
            .expect("register");
        assert!(ensured.created);
        assert_eq!(ensured.user.name, "a");
    }

    #[tokio::test]
    async fn fixture_update_applies_fields() {
        let user = FixtureUserCommand
            .update_profile(
                &email(),
                ProfileUpdate {
                    phone: Some("555".to_owned()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(user.phone.as_deref(), Some("555"));
        assert_eq!(user.name, "a");
    }
}
