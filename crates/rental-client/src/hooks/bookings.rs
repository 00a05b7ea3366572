use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use super::{require_email, scoped_email};
use crate::api::RentalApiClient;
use crate::context::CurrentUser;
use crate::error::ClientError;
use crate::model::{Booking, MessageResponse};
use crate::query::{Query, QueryState};

/// The signed-in user's bookings.
#[derive(Debug)]
pub struct BookingsHook {
    api: Arc<RentalApiClient>,
    user: CurrentUser,
    query: Query<Vec<Booking>>,
}

impl BookingsHook {
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
    pub async fn mount(&self) -> QueryState<Vec<Booking>> {
        self.refetch().await;
        self.state()
    }

    /// Fetch again; a no-op returning `false` while nobody is signed in.
    pub async fn refetch(&self) -> bool {
        let Some(email) = scoped_email(&self.user, "bookings") else {
            return false;
        };
        self.query.fetch(|| self.api.list_bookings(&email)).await
    }

    /// Current cache state.
    #[must_use]
    pub fn state(&self) -> QueryState<Vec<Booking>> {
        self.query.snapshot()
    }

    /// Booking for `residency_id` in the cached list, if any.
    #[must_use]
    pub fn booking_for(&self, residency_id: Uuid) -> Option<Booking> {
        self.state()
            .data?
            .into_iter()
            .find(|booking| booking.residency_id == residency_id)
    }

    /// Book a visit, then refresh.
    ///
    /// # Errors
    /// [`ClientError::NotSignedIn`] without a user, otherwise the API error
    /// (status 409 for a repeated booking).
    pub async fn book(
        &self,
        residency_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<MessageResponse, ClientError> {
        let email = require_email(&self.user)?;
        let response = self.api.book_visit(&email, residency_id, date).await?;
        self.query.invalidate();
        self.refetch().await;
        Ok(response)
    }

    /// Cancel a booking, then refresh.
    ///
    /// # Errors
    /// [`ClientError::NotSignedIn`] without a user, otherwise the API error
    /// (status 404 when nothing was booked).
    pub async fn cancel(&self, residency_id: Uuid) -> Result<MessageResponse, ClientError> {
        let email = require_email(&self.user)?;
        let response = self.api.cancel_booking(&email, residency_id).await?;
        self.query.invalidate();
        self.refetch().await;
        Ok(response)
    }
}
