//! Shared client-session state.
//!
//! Both slots are cheap to clone and share one underlying value, so the API
//! client, the hooks and the identity session observe the same credential
//! and user.

use std::sync::{Arc, PoisonError, RwLock};

use secrecy::SecretString;

/// Holds the bearer credential attached to outgoing API calls.
#[derive(Clone, Default)]
pub struct CredentialSlot(Arc<RwLock<Option<SecretString>>>);

impl CredentialSlot {
    /// Replace the current credential.
    pub fn set(&self, token: SecretString) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Forget the current credential.
    pub fn clear(&self) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The credential to attach, if any.
    #[must_use]
    pub fn current(&self) -> Option<SecretString> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns `true` when a credential is held.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.0.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

impl std::fmt::Debug for CredentialSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSlot")
            .field("present", &self.is_present())
            .finish()
    }
}

/// Email of the signed-in user; hooks scoped to a user read it before
/// fetching.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(Arc<RwLock<Option<String>>>);

impl CurrentUser {
    /// A slot already holding `email`.
    #[must_use]
    pub fn signed_in(email: impl Into<String>) -> Self {
        let user = Self::default();
        user.set(email);
        user
    }

    /// Record the signed-in address.
    pub fn set(&self, email: impl Into<String>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(email.into());
    }

    /// Forget the signed-in address.
    pub fn clear(&self) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Signed-in address, if any.
    #[must_use]
    pub fn email(&self) -> Option<String> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "test code uses expect for clear failure messages")]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn clones_share_the_credential() {
        let slot = CredentialSlot::default();
        let other = slot.clone();
        slot.set(SecretString::from("abc"));
        let token = other.current().expect("credential shared");
        assert_eq!(token.expose_secret(), "abc");
        other.clear();
        assert!(!slot.is_present());
    }

    #[test]
    fn debug_output_hides_the_token() {
        let slot = CredentialSlot::default();
        slot.set(SecretString::from("super-secret"));
        assert!(!format!("{slot:?}").contains("super-secret"));
    }

    #[test]
    fn current_user_round_trips() {
        let user = CurrentUser::default();
        assert_eq!(user.email(), None);
        user.set("a@x.com");
        assert_eq!(user.clone().email().as_deref(), Some("a@x.com"));
    }
}
