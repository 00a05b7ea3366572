//! Validated e-mail address used as the sole user identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reasons an e-mail address is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EmailValidationError {
    /// Nothing but whitespace was supplied.
    #[error("email must not be empty")]
    Empty,
    /// The value does not have the `local@domain` shape.
    #[error("email must contain a single '@' with text on both sides")]
    Malformed,
}

/// Identity key for users and residency owners.
///
/// Addresses are trimmed but otherwise kept verbatim; comparison is exact.
///
/// # Examples
/// ```
/// use rental_backend::domain::EmailAddress;
///
/// let email = EmailAddress::new(" ada@example.com ").expect("valid email");
/// assert_eq!(email.as_ref(), "ada@example.com");
/// assert_eq!(email.local_part(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an address.
    pub fn new(value: impl AsRef<str>) -> Result<Self, EmailValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmailValidationError::Empty);
        }
        let mut parts = trimmed.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(trimmed.to_owned()))
            }
            _ => Err(EmailValidationError::Malformed),
        }
    }

    /// Text before the `@`; used as the default display name.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or(self.0.as_str())
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}
