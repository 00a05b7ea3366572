//! Residency listings and the rules for creating them.
//!
//! A listing is append-only once stored. Creation starts from a loosely typed
//! [`ResidencyDraft`] (whatever the client sent) and is validated into a
//! [`NewResidency`] before it reaches a repository.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::EmailAddress;

/// Storage-assigned listing identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResidencyId(Uuid);

impl ResidencyId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a random identifier; used by non-database adapters.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ResidencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResidencyId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A stored rentable property listing.
///
/// The owner is referenced by e-mail only; there is no referential link to
/// the user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Residency {
    /// Server-assigned identifier.
    pub id: ResidencyId,
    /// Headline shown in listings.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Price in whole currency units.
    pub price: i32,
    /// Street address; empty when not given.
    pub address: String,
    /// City name.
    pub city: String,
    /// Country name.
    pub country: String,
    /// Cover image URL.
    pub image: String,
    /// Amenity labels.
    pub facilities: Vec<String>,
    /// Owner's e-mail address.
    #[serde(rename = "userEmail", alias = "ownerEmail")]
    pub owner_email: EmailAddress,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied listing fields prior to validation.
///
/// `price` stays untyped because clients send it either as a number or as a
/// form string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidencyDraft {
    /// Required headline.
    #[serde(default)]
    pub title: Option<String>,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Required price, numeric or string.
    #[serde(default)]
    pub price: Option<Value>,
    /// Optional street address.
    #[serde(default)]
    pub address: Option<String>,
    /// Optional city.
    #[serde(default)]
    pub city: Option<String>,
    /// Optional country.
    #[serde(default)]
    pub country: Option<String>,
    /// Optional cover image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Optional amenity labels.
    #[serde(default)]
    pub facilities: Option<Vec<String>>,
    /// Required owner e-mail.
    #[serde(default, alias = "ownerEmail")]
    pub user_email: Option<String>,
}

/// Validated listing ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResidency {
    /// Trimmed, non-empty headline.
    pub title: String,
    /// Description; may be empty.
    pub description: String,
    /// Non-negative price.
    pub price: i32,
    /// Street address; may be empty.
    pub address: String,
    /// City; may be empty.
    pub city: String,
    /// Country; may be empty.
    pub country: String,
    /// Cover image URL; may be empty.
    pub image: String,
    /// Amenity labels.
    pub facilities: Vec<String>,
    /// Validated owner address.
    pub owner_email: EmailAddress,
}

/// Reasons a [`ResidencyDraft`] is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResidencyValidationError {
    /// A required field was absent or blank.
    #[error("missing required field: {field}")]
    MissingField {
        /// Wire name of the field.
        field: &'static str,
    },
    /// The owner e-mail is not a valid address.
    #[error("userEmail must be a valid email address")]
    InvalidOwnerEmail {
        /// Rejected input.
        value: String,
    },
    /// The price could not be read as an integer.
    #[error("price must be an integer")]
    InvalidPrice {
        /// Rejected input.
        value: String,
    },
    /// The price parsed but is below zero.
    #[error("price must not be negative")]
    NegativePrice {
        /// Parsed price.
        value: i64,
    },
}

impl ResidencyValidationError {
    /// Wire name of the offending field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } => *field,
            Self::InvalidOwnerEmail { .. } => "userEmail",
            Self::InvalidPrice { .. } | Self::NegativePrice { .. } => "price",
        }
    }

    /// Stable machine-readable reason.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::InvalidOwnerEmail { .. } => "invalid_email",
            Self::InvalidPrice { .. } => "invalid_price",
            Self::NegativePrice { .. } => "negative_price",
        }
    }

    /// Rejected input, when there was one.
    #[must_use]
    pub fn value(&self) -> Option<String> {
        match self {
            Self::MissingField { .. } => None,
            Self::InvalidOwnerEmail { value } | Self::InvalidPrice { value } => {
                Some(value.clone())
            }
            Self::NegativePrice { value } => Some(value.to_string()),
        }
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ResidencyValidationError> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
        .ok_or(ResidencyValidationError::MissingField { field })
}

fn optional(value: Option<String>) -> String {
    value.map(|text| text.trim().to_owned()).unwrap_or_default()
}

/// Read the leading integer out of `raw` the way browser form handling does:
/// leading whitespace and an optional sign are allowed, parsing stops at the
/// first non-digit, and at least one digit is required.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, trimmed.get(1..)?),
        Some(b'+') => (false, trimmed.get(1..)?),
        _ => (false, trimmed),
    };
    let digits_end = rest
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map_or(rest.len(), |(index, _)| index);
    let digits = rest.get(..digits_end)?;
    if digits.is_empty() {
        return None;
    }
    let magnitude: i64 = digits.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Coerce a JSON price into an integer.
///
/// Numbers and strings share one path so `1200`, `1200.9` and `"1200 EUR"`
/// all read as `1200`.
///
/// # Examples
/// ```
/// use rental_backend::domain::coerce_price;
/// use serde_json::json;
///
/// assert_eq!(coerce_price(&json!("1200")), Ok(1200));
/// assert_eq!(coerce_price(&json!(950)), Ok(950));
/// assert!(coerce_price(&json!("cheap")).is_err());
/// ```
pub fn coerce_price(value: &Value) -> Result<i32, ResidencyValidationError> {
    let raw = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        other => {
            return Err(ResidencyValidationError::InvalidPrice {
                value: other.to_string(),
            });
        }
    };
    let parsed = leading_integer(&raw).ok_or_else(|| ResidencyValidationError::InvalidPrice {
        value: raw.clone(),
    })?;
    if parsed < 0 {
        return Err(ResidencyValidationError::NegativePrice { value: parsed });
    }
    i32::try_from(parsed).map_err(|_| ResidencyValidationError::InvalidPrice { value: raw })
}

impl ResidencyDraft {
    /// Validate required fields and normalise the rest.
    pub fn validate(self) -> Result<NewResidency, ResidencyValidationError> {
        let Self {
            title,
            description,
            price,
            address,
            city,
            country,
            image,
            facilities,
            user_email,
        } = self;

        let title = required(title, "title")?;
        let price = price
            .filter(|value| !value.is_null())
            .ok_or(ResidencyValidationError::MissingField { field: "price" })
            .and_then(|value| coerce_price(&value))?;
        let raw_email = required(user_email, "userEmail")?;
        let owner_email = EmailAddress::new(&raw_email)
            .map_err(|_| ResidencyValidationError::InvalidOwnerEmail { value: raw_email })?;

        let facilities = facilities
            .unwrap_or_default()
            .into_iter()
            .map(|facility| facility.trim().to_owned())
            .filter(|facility| !facility.is_empty())
            .collect();

        Ok(NewResidency {
            title,
            description: optional(description),
            price,
            address: optional(address),
            city: optional(city),
            country: optional(country),
            image: optional(image),
            facilities,
            owner_email,
        })
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "test code uses expect for clear failure messages")]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    fn loft_draft() -> ResidencyDraft {
        ResidencyDraft {
            title: Some("Loft".to_owned()),
            description: Some("Bright open-plan loft".to_owned()),
            price: Some(json!("1200")),
            address: Some("1 Canal Street".to_owned()),
            city: Some("Manchester".to_owned()),
            country: Some("UK".to_owned()),
            image: Some("https://img.example/loft.jpg".to_owned()),
            facilities: Some(vec!["wifi".to_owned(), " ".to_owned()]),
            user_email: Some("a@x.com".to_owned()),
        }
    }

    #[fixture]
    fn loft() -> ResidencyDraft {
        loft_draft()
    }

    #[rstest]
    #[case(json!(1200), 1200)]
    #[case(json!("1200"), 1200)]
    #[case(json!("  1200  "), 1200)]
    #[case(json!("1200.50"), 1200)]
    #[case(json!(1200.9), 1200)]
    #[case(json!("+75 per night"), 75)]
    #[case(json!(0), 0)]
    fn price_coercion_accepts_numeric_prefixes(#[case] raw: Value, #[case] expected: i32) {
        assert_eq!(coerce_price(&raw), Ok(expected));
    }

    #[rstest]
    #[case(json!("cheap"))]
    #[case(json!(""))]
    #[case(json!("-"))]
    #[case(json!(true))]
    #[case(json!(["1200"]))]
    #[case(json!("99999999999"))]
    fn price_coercion_rejects_non_numbers(#[case] raw: Value) {
        assert!(matches!(
            coerce_price(&raw),
            Err(ResidencyValidationError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn negative_price_is_rejected() {
        assert_eq!(
            coerce_price(&json!("-5")),
            Err(ResidencyValidationError::NegativePrice { value: -5 })
        );
    }

    #[rstest]
    fn draft_validates_into_new_residency(loft: ResidencyDraft) {
        let residency = loft.validate().expect("valid draft");
        assert_eq!(residency.price, 1200);
        assert_eq!(residency.owner_email.as_ref(), "a@x.com");
        assert_eq!(residency.facilities, vec!["wifi".to_owned()]);
    }

    #[rstest]
    #[case::title(ResidencyDraft { title: Some("  ".to_owned()), ..loft_draft() }, "title")]
    #[case::price(ResidencyDraft { price: None, ..loft_draft() }, "price")]
    #[case::null_price(ResidencyDraft { price: Some(Value::Null), ..loft_draft() }, "price")]
    #[case::email(ResidencyDraft { user_email: None, ..loft_draft() }, "userEmail")]
    fn draft_reports_missing_fields(#[case] draft: ResidencyDraft, #[case] field: &str) {
        let error = draft.validate().expect_err("missing field");
        assert_eq!(error.field(), field);
        assert_eq!(error.code(), "missing_field");
    }

    #[rstest]
    fn draft_rejects_malformed_owner(loft: ResidencyDraft) {
        let draft = ResidencyDraft {
            user_email: Some("not-an-email".to_owned()),
            ..loft
        };
        let error = draft.validate().expect_err("bad email");
        assert_eq!(error.code(), "invalid_email");
        assert_eq!(error.value().as_deref(), Some("not-an-email"));
    }

    #[test]
    fn draft_accepts_owner_email_alias() {
        let draft: ResidencyDraft = serde_json::from_value(json!({
            "title": "Cabin",
            "price": 900,
            "ownerEmail": "b@x.com",
        }))
        .expect("deserialise draft");
        assert_eq!(draft.user_email.as_deref(), Some("b@x.com"));
    }

    #[test]
    fn residency_serialises_owner_as_user_email() {
        let now = Utc::now();
        let residency = Residency {
            id: ResidencyId::random(),
            title: "Loft".to_owned(),
            description: String::new(),
            price: 1200,
            address: String::new(),
            city: String::new(),
            country: String::new(),
            image: String::new(),
            facilities: Vec::new(),
            owner_email: EmailAddress::new("a@x.com").expect("valid"),
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&residency).expect("serialise");
        assert_eq!(value.get("userEmail"), Some(&json!("a@x.com")));
        assert_eq!(value.get("price"), Some(&json!(1200)));
        assert!(value.get("createdAt").is_some());
    }
}
