//! Driving port for reading a user's bookings and favourites.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{Booking, EmailAddress, Error, ResidencyId};

/// Use-case port for read-only user collections.
///
/// Unknown users read as empty collections and are not created.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserQuery: Send + Sync {
    /// Bookings held by the user.
    async fn list_bookings(&self, email: &EmailAddress) -> Result<Vec<Booking>, Error>;

    /// Residencies the user has favourited.
    async fn list_favourites(&self, email: &EmailAddress)
    -> Result<BTreeSet<ResidencyId>, Error>;
}

/// Fixture implementation reporting empty collections.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserQuery;

#[async_trait]
impl UserQuery for FixtureUserQuery {
    async fn list_bookings(&self, _email: &EmailAddress) -> Result<Vec<Booking>, Error> {
        Ok(Vec::new())
    }

    async fn list_favourites(
        &self,
        _email: &EmailAddress,
    ) -> Result<BTreeSet<ResidencyId>, Error> {
        Ok(BTreeSet::new())
    }
}
