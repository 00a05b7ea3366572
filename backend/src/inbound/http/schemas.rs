//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic and do not derive `ToSchema`. The
//! wrappers here mirror their wire shape and register under the domain type's
//! path so generated documents read naturally.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request clashes with existing state, such as a duplicate booking.
    #[schema(rename = "conflict")]
    Conflict,
    /// Storage is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Already booked")]
    message: String,
    /// Correlation identifier matching the `trace-id` response header.
    #[schema(example = "6f1f0a86-0f5e-4a55-9a1c-4e0d5d4f7b11")]
    trace_id: Option<String>,
    /// Field-level context such as `{field, code, value}`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Residency`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Residency, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ResidencySchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(example = "Canal-side loft")]
    title: String,
    description: String,
    #[schema(example = 1200)]
    price: i32,
    address: String,
    city: String,
    country: String,
    /// Image URL or inline data URI.
    image: String,
    facilities: Vec<String>,
    /// Owner e-mail.
    #[schema(example = "owner@example.com")]
    user_email: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::ResidencyDraft`].
///
/// `price` may be a number or a numeric string; `ownerEmail` is accepted in
/// place of `userEmail`.
#[derive(ToSchema)]
#[schema(as = crate::domain::ResidencyDraft, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ResidencyDraftSchema {
    #[schema(example = "Loft")]
    title: String,
    description: Option<String>,
    #[schema(value_type = Object, example = "1200")]
    price: serde_json::Value,
    address: Option<String>,
    city: Option<String>,
    country: Option<String>,
    image: Option<String>,
    facilities: Option<Vec<String>>,
    #[schema(example = "a@x.com")]
    user_email: String,
}

/// OpenAPI schema for [`crate::domain::Booking`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Booking, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct BookingSchema {
    #[schema(value_type = String, format = Uuid)]
    residency_id: String,
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    date: String,
}

/// OpenAPI schema for [`crate::domain::User`].
#[derive(ToSchema)]
#[schema(as = crate::domain::User, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct UserSchema {
    #[schema(example = "ada@example.com")]
    email: String,
    #[schema(example = "ada")]
    name: String,
    gender: Option<String>,
    phone: Option<String>,
    image: Option<String>,
    booked_visits: Vec<BookingSchema>,
    #[schema(value_type = Vec<String>)]
    favourite_residency_ids: Vec<String>,
}
