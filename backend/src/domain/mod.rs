//! Domain primitives, aggregates and services.
//!
//! Purpose: define the rental marketplace's entities and use-cases
//! independently of HTTP and storage. Inbound adapters speak to the services
//! through the driving ports in [`ports`]; outbound adapters implement the
//! driven repository ports.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - EmailAddress: the user identity key.
//! - Residency and friends: listings and the draft validation rules.
//! - User, Booking, ProfileUpdate: account state.
//! - ResidencyService, UserAccountService: the port implementations.

pub mod email;
pub mod error;
pub mod ports;
pub mod residency;
pub mod residency_service;
pub mod trace_id;
pub mod user;
pub mod user_account_service;

pub use self::email::{EmailAddress, EmailValidationError};
pub use self::error::{Error, ErrorCode};
pub use self::residency::{
    NewResidency, Residency, ResidencyDraft, ResidencyId, ResidencyValidationError, coerce_price,
};
pub use self::residency_service::{ResidencyService, residency_validation_error};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Booking, EnsuredUser, FavouriteToggle, ProfileUpdate, User};
pub use self::user_account_service::UserAccountService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use rental_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
