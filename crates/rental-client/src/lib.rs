//! Client for the rental marketplace API.
//!
//! - [`RentalApiClient`]: typed access to every REST route.
//! - [`hooks`]: cached queries over residencies, bookings and favourites
//!   that refresh after mutations.
//! - [`identity`]: credential acquisition, storage and user registration.
//! - [`presentation`]: search, listing wizard and profile form helpers.

pub mod api;
pub mod context;
pub mod error;
pub mod hooks;
pub mod identity;
pub mod model;
pub mod presentation;
pub mod query;

pub use api::RentalApiClient;
pub use context::{CredentialSlot, CurrentUser};
pub use error::ClientError;
pub use query::{Query, QueryState};
