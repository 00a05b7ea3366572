//! Driving port for reading residencies.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use uuid::Uuid;

use crate::domain::{EmailAddress, Error, Residency, ResidencyId};

/// Use-case port for listing lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResidencyQuery: Send + Sync {
    /// Every listing, newest first.
    async fn list_all(&self) -> Result<Vec<Residency>, Error>;

    /// A single listing.
    ///
    /// # Errors
    ///
    /// `not_found` when no listing has the identifier.
    async fn get_by_id(&self, id: &ResidencyId) -> Result<Residency, Error>;
}

/// Identifier of the listing served by [`FixtureResidencyQuery`].
pub const FIXTURE_RESIDENCY_ID: Uuid = Uuid::from_u128(0x3fa8_5f64_5717_4562_b3fc_2c96_3f66_afa6);

/// Canned listing returned by [`FixtureResidencyQuery`].
#[must_use]
pub fn fixture_residency() -> Residency {
    let created_at = Utc
        .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .unwrap_or_default();
    Residency {
        id: ResidencyId::from_uuid(FIXTURE_RESIDENCY_ID),
        title: "Canal-side loft".to_owned(),
        description: "Two-bedroom loft overlooking the canal.".to_owned(),
        price: 1200,
        address: "1 Canal Street".to_owned(),
        city: "Manchester".to_owned(),
        country: "United Kingdom".to_owned(),
        image: "https://images.example/loft.jpg".to_owned(),
        facilities: vec!["wifi".to_owned(), "parking".to_owned()],
        owner_email: EmailAddress::new("owner@example.com")
            .unwrap_or_else(|error| panic!("fixture email literal must be valid: {error}")),
        created_at,
        updated_at: created_at,
    }
}

/// Fixture implementation serving a single canned listing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureResidencyQuery;

#[async_trait]
impl ResidencyQuery for FixtureResidencyQuery {
    async fn list_all(&self) -> Result<Vec<Residency>, Error> {
        Ok(vec![fixture_residency()])
    }

    async fn get_by_id(&self, id: &ResidencyId) -> Result<Residency, Error> {
        if id.as_uuid() == &FIXTURE_RESIDENCY_ID {
            Ok(fixture_residency())
        } else {
            Err(Error::not_found("Residency not found"))
        }
    }
}
