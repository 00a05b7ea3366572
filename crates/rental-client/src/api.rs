//! Async HTTP client for the rental REST API.
//!
//! Every route lives under the configured base URL (normally
//! `http://host:8000/api/`). The credential held in the shared
//! [`CredentialSlot`] is attached as a bearer token when present; calls made
//! without one are still sent.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::NaiveDate;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::context::CredentialSlot;
use crate::error::ClientError;
use crate::model::{
    Booking, ErrorResponse, FavouriteToggle, MessageResponse, NewListing, ProfileChanges,
    RegisterResponse, Residency, UserProfile,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Async client for the rental API.
#[derive(Debug, Clone)]
pub struct RentalApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: CredentialSlot,
}

impl RentalApiClient {
    /// Build a client with its own connection pool.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidUrl`] for a malformed base URL and
    /// [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, credentials: CredentialSlot) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Self::from_reqwest(base_url, http, credentials)
    }

    /// Wrap an existing `reqwest::Client`.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidUrl`] for a malformed base URL.
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        credentials: CredentialSlot,
    ) -> Result<Self, ClientError> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    /// Ensure the base ends with `/` so relative joins keep its path.
    fn normalize_base_url(raw: &str) -> Result<Url, ClientError> {
        let trimmed = raw.trim_end_matches('/');
        Ok(Url::parse(&format!("{trimmed}/"))?)
    }

    /// The shared credential slot read on every request.
    #[must_use]
    pub fn credentials(&self) -> &CredentialSlot {
        &self.credentials
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credentials.current() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.authorize(self.http.get(url)).send().await?;
        Self::handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.authorize(self.http.post(url)).json(body).send().await?;
        Self::handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| ClientError::Deserialization {
                message: e.to_string(),
                body,
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> ClientError {
        let raw = resp.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(err) => ClientError::Api {
                status: status.as_u16(),
                code: err.code,
                message: err.message,
                trace_id: err.trace_id,
            },
            Err(_) => ClientError::Api {
                status: status.as_u16(),
                code: "unknown".to_owned(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                trace_id: None,
            },
        }
    }

    // ── Residencies ──────────────────────────────────────────────────

    /// List every residency, newest first.
    ///
    /// # Errors
    /// Transport, decoding and API failures.
    pub async fn list_residencies(&self) -> Result<Vec<Residency>, ClientError> {
        self.get("residency").await
    }

    /// Fetch one residency.
    ///
    /// # Errors
    /// [`ClientError::Api`] with status 404 when the id is unknown.
    pub async fn get_residency(&self, id: Uuid) -> Result<Residency, ClientError> {
        self.get(&format!("residency/{id}")).await
    }

    /// Create a listing and return the stored record.
    ///
    /// # Errors
    /// Status 400 for invalid fields and 409 for a duplicate address.
    pub async fn create_residency(&self, listing: &NewListing) -> Result<Residency, ClientError> {
        self.post("residency/create", &json!({ "data": listing })).await
    }

    // ── Users ────────────────────────────────────────────────────────

    /// Ensure a user record exists for `email`.
    ///
    /// # Errors
    /// Transport, decoding and API failures.
    pub async fn register(&self, email: &str) -> Result<RegisterResponse, ClientError> {
        self.post("user/register", &json!({ "email": email })).await
    }

    /// Book a visit; the server uses today's date when `date` is `None`.
    ///
    /// # Errors
    /// Status 409 when the residency is already booked by this user.
    pub async fn book_visit(
        &self,
        email: &str,
        residency_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<MessageResponse, ClientError> {
        self.post(
            &format!("user/bookVisit/{residency_id}"),
            &json!({ "email": email, "date": date }),
        )
        .await
    }

    /// List the user's bookings.
    ///
    /// # Errors
    /// Transport, decoding and API failures.
    pub async fn list_bookings(&self, email: &str) -> Result<Vec<Booking>, ClientError> {
        self.post("user/allBookings", &json!({ "email": email })).await
    }

    /// Cancel a booking.
    ///
    /// # Errors
    /// Status 404 when nothing was booked.
    pub async fn cancel_booking(
        &self,
        email: &str,
        residency_id: Uuid,
    ) -> Result<MessageResponse, ClientError> {
        self.post(
            &format!("user/removeBooking/{residency_id}"),
            &json!({ "email": email }),
        )
        .await
    }

    /// Flip a residency's membership in the user's favourites.
    ///
    /// # Errors
    /// Transport, decoding and API failures.
    pub async fn toggle_favourite(
        &self,
        email: &str,
        residency_id: Uuid,
    ) -> Result<FavouriteToggle, ClientError> {
        self.post(
            &format!("user/toFav/{residency_id}"),
            &json!({ "email": email }),
        )
        .await
    }

    /// List the user's favourite residency ids.
    ///
    /// # Errors
    /// Transport, decoding and API failures.
    pub async fn list_favourites(&self, email: &str) -> Result<BTreeSet<Uuid>, ClientError> {
        self.post("user/allFav", &json!({ "email": email })).await
    }

    /// Read the stored profile.
    ///
    /// # Errors
    /// Status 404 when the user has never registered.
    pub async fn get_profile(&self, email: &str) -> Result<UserProfile, ClientError> {
        self.post("user/profile/get", &json!({ "email": email })).await
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    /// Transport, decoding and API failures.
    pub async fn update_profile(
        &self,
        email: &str,
        changes: &ProfileChanges,
    ) -> Result<UserProfile, ClientError> {
        let mut body = serde_json::to_value(changes).map_err(|e| ClientError::Deserialization {
            message: e.to_string(),
            body: String::new(),
        })?;
        if let Some(object) = body.as_object_mut() {
            object.insert("email".to_owned(), json!(email));
        }
        self.post("user/profile/update", &body).await
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "test code uses expect for clear failure messages")]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:8000/api", "http://localhost:8000/api/residency")]
    #[case("http://localhost:8000/api/", "http://localhost:8000/api/residency")]
    #[case("http://localhost:8000", "http://localhost:8000/residency")]
    fn base_url_keeps_its_path(#[case] base: &str, #[case] expected: &str) {
        let client =
            RentalApiClient::from_reqwest(base, reqwest::Client::new(), CredentialSlot::default())
                .expect("client");
        assert_eq!(client.url("residency").expect("url").as_str(), expected);
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let err = RentalApiClient::from_reqwest(
            "not a url",
            reqwest::Client::new(),
            CredentialSlot::default(),
        )
        .expect_err("invalid");
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }
}
