//! Driving port for creating residencies.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{Error, Residency, ResidencyDraft, ResidencyId, residency_validation_error};

/// Use-case port for listing creation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResidencyCommand: Send + Sync {
    /// Validate and store a listing, making sure its owner has a user record.
    ///
    /// # Errors
    ///
    /// - `invalid_request` when a required field is missing or the price is
    ///   not an integer.
    /// - `conflict` when the store rejects a duplicate listing.
    async fn create(&self, draft: ResidencyDraft) -> Result<Residency, Error>;
}

/// Fixture implementation that validates but does not persist.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureResidencyCommand;

#[async_trait]
impl ResidencyCommand for FixtureResidencyCommand {
    async fn create(&self, draft: ResidencyDraft) -> Result<Residency, Error> {
        let new = draft.validate().map_err(residency_validation_error)?;
        let now = Utc::now();
        Ok(Residency {
            id: ResidencyId::random(),
            title: new.title,
            description: new.description,
            price: new.price,
            address: new.address,
            city: new.city,
            country: new.country,
            image: new.image,
            facilities: new.facilities,
            owner_email: new.owner_email,
            created_at: now,
            updated_at: now,
        })
    }
}
