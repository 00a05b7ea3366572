//! Client data hooks.
//!
//! Each hook owns a [`Query`](crate::query::Query) over one API collection.
//! `mount` performs the initial fetch, mutations go through the API and then
//! invalidate and refetch so the next read reflects them. Hooks scoped to a
//! user skip fetching while [`CurrentUser`](crate::CurrentUser) is empty.

mod bookings;
mod favourites;
mod residencies;

pub use bookings::BookingsHook;
pub use favourites::FavouritesHook;
pub use residencies::ResidenciesHook;

use tracing::debug;

use crate::context::CurrentUser;
use crate::error::ClientError;

fn require_email(user: &CurrentUser) -> Result<String, ClientError> {
    user.email().ok_or(ClientError::NotSignedIn)
}

fn scoped_email(user: &CurrentUser, hook: &'static str) -> Option<String> {
    let email = user.email();
    if email.is_none() {
        debug!(hook, "no signed-in user; skipping fetch");
    }
    email
}
