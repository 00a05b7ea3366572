//! Wire types exchanged with the rental API.
//!
//! Field names follow the server's camelCase JSON. Optional text fields
//! default to empty so older records without them still decode.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rentable property listing as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Residency {
    /// Server-assigned identifier.
    pub id: Uuid,
    /// Listing headline.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Whole-currency price.
    pub price: i32,
    /// Street address.
    pub address: String,
    /// City.
    #[serde(default)]
    pub city: String,
    /// Country.
    #[serde(default)]
    pub country: String,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    /// Facility labels.
    #[serde(default)]
    pub facilities: Vec<String>,
    /// Email of the owning user.
    pub user_email: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Body of a listing-creation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    /// Listing headline.
    pub title: String,
    /// Listing description.
    pub description: String,
    /// Price in whole currency units.
    pub price: i32,
    /// Street address.
    pub address: String,
    /// City name.
    pub city: String,
    /// Country name.
    pub country: String,
    /// Cover image URL.
    pub image: String,
    /// Amenity labels.
    pub facilities: Vec<String>,
    /// Owner's e-mail address.
    pub user_email: String,
}

/// A scheduled visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Residency being visited.
    pub residency_id: Uuid,
    /// Visit day.
    pub date: NaiveDate,
}

/// A user's stored profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Account e-mail address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Free-form gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// Contact number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Scheduled visits.
    #[serde(default)]
    pub booked_visits: Vec<Booking>,
    /// Favourited listings.
    #[serde(default)]
    pub favourite_residency_ids: BTreeSet<Uuid>,
}

/// Partial profile update; `None` fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileChanges {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New gender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// New contact number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// New avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Plain acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    /// Human-readable status.
    pub message: String,
}

/// Answer to `POST /user/register`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterResponse {
    /// Human-readable status.
    pub message: String,
    /// Stored or newly created profile.
    pub user: UserProfile,
}

/// Answer to a favourite toggle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FavouriteToggle {
    /// Human-readable status.
    pub message: String,
    /// `true` when the residency was added.
    pub added: bool,
    /// Favourites after the toggle.
    pub favourites: BTreeSet<Uuid>,
}

/// Error envelope returned by the API on failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub trace_id: Option<String>,
}
