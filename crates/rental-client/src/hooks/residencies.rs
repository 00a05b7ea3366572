use std::sync::Arc;

use tracing::info;

use crate::api::RentalApiClient;
use crate::error::ClientError;
use crate::model::{NewListing, Residency};
use crate::presentation::matches_property_filter;
use crate::query::{Query, QueryState};

/// Residency list with creation.
#[derive(Debug)]
pub struct ResidenciesHook {
    api: Arc<RentalApiClient>,
    query: Query<Vec<Residency>>,
}

impl ResidenciesHook {
    /// Hook with an empty cache.
    #[must_use]
    pub fn new(api: Arc<RentalApiClient>) -> Self {
        Self {
            api,
            query: Query::new(),
        }
    }

    /// Initial fetch.
    pub async fn mount(&self) -> QueryState<Vec<Residency>> {
        self.refetch().await;
        self.state()
    }

    /// Fetch the list again; returns whether the result was applied.
    pub async fn refetch(&self) -> bool {
        self.query.fetch(|| self.api.list_residencies()).await
    }

    /// Current cache state.
    #[must_use]
    pub fn state(&self) -> QueryState<Vec<Residency>> {
        self.query.snapshot()
    }

    /// Cached residencies matching `filter`; empty while nothing is cached.
    #[must_use]
    pub fn filtered(&self, filter: &str) -> Vec<Residency> {
        self.state()
            .data
            .unwrap_or_default()
            .into_iter()
            .filter(|residency| matches_property_filter(residency, filter))
            .collect()
    }

    /// Create a listing, then refresh the cached list.
    ///
    /// # Errors
    /// The API error; the cache is left untouched on failure.
    pub async fn create(&self, listing: &NewListing) -> Result<Residency, ClientError> {
        let created = self.api.create_residency(listing).await?;
        info!(residency_id = %created.id, "listing created");
        self.query.invalidate();
        self.refetch().await;
        Ok(created)
    }
}
