use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use super::{require_email, scoped_email};
use crate::api::RentalApiClient;
use crate::context::CurrentUser;
use crate::error::ClientError;
use crate::model::FavouriteToggle;
use crate::presentation::toggle_favourite_ids;
use crate::query::{Query, QueryState};

/// The signed-in user's favourite residency ids.
///
/// Toggling updates the cache before the request is sent and flips the same
/// id back if the request fails, leaving other pending toggles in place.
#[derive(Debug)]
pub struct FavouritesHook {
    api: Arc<RentalApiClient>,
    user: CurrentUser,
    query: Query<BTreeSet<Uuid>>,
}

impl FavouritesHook {
    /// Hook scoped to `user`.
    #[must_use]
    pub fn new(api: Arc<RentalApiClient>, user: CurrentUser) -> Self {
        Self {
            api,
            user,
            query: Query::new(),
        }
    }

    /// Initial fetch.
    pub async fn mount(&self) -> QueryState<BTreeSet<Uuid>> {
        self.refetch().await;
        self.state()
    }

    /// Fetch again; a no-op returning `false` while nobody is signed in.
    pub async fn refetch(&self) -> bool {
        let Some(email) = scoped_email(&self.user, "favourites") else {
            return false;
        };
        self.query.fetch(|| self.api.list_favourites(&email)).await
    }

    /// Current cache state.
    #[must_use]
    pub fn state(&self) -> QueryState<BTreeSet<Uuid>> {
        self.query.snapshot()
    }

    /// Whether `residency_id` is in the cached set.
    #[must_use]
    pub fn is_favourite(&self, residency_id: Uuid) -> bool {
        self.state()
            .data
            .is_some_and(|favourites| favourites.contains(&residency_id))
    }

    /// Optimistically flip `residency_id`, then confirm with the server.
    ///
    /// # Errors
    /// [`ClientError::NotSignedIn`] without a user, otherwise the API error
    /// after the cache has been rolled back.
    pub async fn toggle(&self, residency_id: Uuid) -> Result<FavouriteToggle, ClientError> {
        let email = require_email(&self.user)?;
        let flip = |current: Option<&BTreeSet<Uuid>>| {
            toggle_favourite_ids(residency_id, &current.cloned().unwrap_or_default())
        };
        self.query.update_data(flip);

        match self.api.toggle_favourite(&email, residency_id).await {
            Ok(toggled) => {
                self.query.replace_data(Some(toggled.favourites.clone()));
                self.refetch().await;
                Ok(toggled)
            }
            Err(err) => {
                warn!(error = %err, %residency_id, "favourite toggle failed; rolling back");
                self.query.update_data(flip);
                Err(err)
            }
        }
    }
}
