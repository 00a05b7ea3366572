//! User accounts, bookings and favourites.
//!
//! Users are keyed by e-mail alone; credentials live with the identity
//! provider. Bookings and favourites hang off the user and are unique per
//! residency.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{EmailAddress, ResidencyId};

/// A scheduled visit to a residency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Residency being visited.
    pub residency_id: ResidencyId,
    /// Visit day.
    pub date: NaiveDate,
}

/// A registered user together with their bookings and favourites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Primary key.
    pub email: EmailAddress,
    /// Display name.
    pub name: String,
    /// Free-form gender.
    pub gender: Option<String>,
    /// Contact number.
    pub phone: Option<String>,
    /// Avatar URL.
    pub image: Option<String>,
    /// At most one booking per residency.
    pub booked_visits: Vec<Booking>,
    /// Favourited listings.
    pub favourite_residency_ids: BTreeSet<ResidencyId>,
}

impl User {
    /// Stub record created by the ensure step: the display name defaults to
    /// the local part of the address and every collection starts empty.
    ///
    /// # Examples
    /// ```
    /// use rental_backend::domain::{EmailAddress, User};
    ///
    /// let user = User::stub(EmailAddress::new("ada@example.com").expect("valid"));
    /// assert_eq!(user.name, "ada");
    /// assert!(user.booked_visits.is_empty());
    /// ```
    #[must_use]
    pub fn stub(email: EmailAddress) -> Self {
        let name = email.local_part().to_owned();
        Self {
            email,
            name,
            gender: None,
            phone: None,
            image: None,
            booked_visits: Vec::new(),
            favourite_residency_ids: BTreeSet::new(),
        }
    }
}

/// Partial profile edit; `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// New contact number.
    #[serde(default)]
    pub phone: Option<String>,
    /// New avatar URL.
    #[serde(default)]
    pub image: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

impl ProfileUpdate {
    /// Treat blank strings as absent so a form round-trip never erases data.
    #[must_use]
    pub fn normalised(self) -> Self {
        Self {
            name: present(self.name),
            gender: present(self.gender),
            phone: present(self.phone),
            image: present(self.image),
        }
    }

    /// True when no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.gender.is_none() && self.phone.is_none() && self.image.is_none()
    }

    /// Overlay the provided fields onto `user`.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name.clone_from(name);
        }
        if let Some(gender) = &self.gender {
            user.gender = Some(gender.clone());
        }
        if let Some(phone) = &self.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(image) = &self.image {
            user.image = Some(image.clone());
        }
    }
}

/// Outcome of an ensure-user call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredUser {
    /// The stored record.
    pub user: User,
    /// `true` when this call inserted the record.
    pub created: bool,
}

/// Result of flipping a favourite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteToggle {
    /// `true` when the residency was added, `false` when it was removed.
    pub added: bool,
    /// Favourites after the toggle.
    pub favourites: BTreeSet<ResidencyId>,
}
