//! Shared validation helpers for inbound HTTP adapters.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;

use crate::domain::{EmailAddress, Error, ResidencyId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidEmail,
    InvalidUuid,
    InvalidDate,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
        }
    }
}

/// Wire name of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const EMAIL: FieldName = FieldName::new("email");
pub(crate) const DATE: FieldName = FieldName::new("date");

fn field_error(message: impl Into<String>, field: FieldName, code: ErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_value_error(
    message: impl Into<String>,
    field: FieldName,
    code: ErrorCode,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

/// The e-mail carried in a user request body.
///
/// Absent or blank values are reported as "Email is required"; malformed
/// values name the rejected input.
pub(crate) fn require_email(value: Option<&str>) -> Result<EmailAddress, Error> {
    let raw = value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| field_error("Email is required", EMAIL, ErrorCode::MissingField))?;
    EmailAddress::new(raw).map_err(|_| {
        field_value_error(
            "Email must be a valid address",
            EMAIL,
            ErrorCode::InvalidEmail,
            raw,
        )
    })
}

/// Residency id from a booking or favourite path segment.
pub(crate) fn parse_residency_id(value: &str, field: FieldName) -> Result<ResidencyId, Error> {
    value.parse().map_err(|_| {
        field_value_error(
            format!("{} must be a valid UUID", field.as_str()),
            field,
            ErrorCode::InvalidUuid,
            value,
        )
    })
}

/// Visit date as an ISO-8601 calendar date or an RFC 3339 timestamp (whose
/// UTC date is used). Blank means "not supplied".
pub(crate) fn parse_optional_visit_date(value: Option<&str>) -> Result<Option<NaiveDate>, Error> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| Some(timestamp.with_timezone(&Utc).date_naive()))
        .map_err(|_| {
            field_value_error(
                "date must be an ISO-8601 date",
                DATE,
                ErrorCode::InvalidDate,
                raw,
            )
        })
}
