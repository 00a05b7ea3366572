use std::collections::BTreeSet;

use uuid::Uuid;

use crate::model::Residency;

/// Message shown for text fields shorter than three characters.
pub const SHORT_TEXT_MESSAGE: &str = "Must have atleast 3 characters";

/// Case-insensitive search over title, city, country and address.
///
/// A blank filter matches everything.
#[must_use]
pub fn matches_property_filter(residency: &Residency, filter: &str) -> bool {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    [
        &residency.title,
        &residency.city,
        &residency.country,
        &residency.address,
    ]
    .into_iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

/// Flip `id` in a local copy of the favourites set.
#[must_use]
pub fn toggle_favourite_ids(id: Uuid, favourites: &BTreeSet<Uuid>) -> BTreeSet<Uuid> {
    let mut next = favourites.clone();
    if !next.remove(&id) {
        next.insert(id);
    }
    next
}

/// Reject text shorter than three characters.
#[must_use]
pub fn validate_string(value: &str) -> Option<&'static str> {
    (value.chars().count() < 3).then_some(SHORT_TEXT_MESSAGE)
}
