//! Signed-in session: credential, user email and registration.

use std::sync::Arc;

use tracing::{info, warn};

use super::IdentityError;
use super::chain::{CredentialChain, CredentialOutcome};
use crate::api::RentalApiClient;
use crate::context::CurrentUser;
use crate::error::ClientError;
use crate::presentation::IdentityClaims;

/// Ties the credential chain to the API client and the current user.
///
/// After every acquisition the user's email is resolved (from the stored
/// credential or the provider's claims) and the user is registered with the
/// API. Registration failures are logged and do not fail the acquisition.
pub struct Session {
    api: Arc<RentalApiClient>,
    chain: CredentialChain,
    user: CurrentUser,
}

impl Session {
    /// Session over `api`, filling `user` once signed in.
    #[must_use]
    pub fn new(api: Arc<RentalApiClient>, chain: CredentialChain, user: CurrentUser) -> Self {
        Self { api, chain, user }
    }

    /// The signed-in user context.
    #[must_use]
    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    /// Load the stored credential and email; returns whether one was found.
    pub fn restore(&self) -> bool {
        let Some(credential) = self.chain.restore() else {
            return false;
        };
        if self.user.email().is_none() {
            if let Some(email) = credential.email {
                self.user.set(email);
            }
        }
        true
    }

    /// Run the credential chain ahead of a protected action.
    pub async fn ensure_credential(&self) -> CredentialOutcome {
        let outcome = self.chain.acquire().await;
        if outcome.is_acquired() {
            self.after_acquisition().await;
        }
        outcome
    }

    /// Explicit interactive login; returns the signed-in email.
    ///
    /// # Errors
    /// [`ClientError::Identity`] when no credential could be obtained or the
    /// provider did not report an email.
    pub async fn login(&self) -> Result<String, ClientError> {
        if !self.chain.login().await.is_acquired() {
            return Err(IdentityError::LoginRequired.into());
        }
        self.after_acquisition().await.ok_or_else(|| {
            IdentityError::Rejected {
                error: "missing_email".to_owned(),
                description: "the identity provider did not report an email".to_owned(),
            }
            .into()
        })
    }

    /// Forget the stored credential and the current user.
    ///
    /// # Errors
    /// [`ClientError::TokenStore`] when the stored credential cannot be
    /// removed.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.chain.store().clear()?;
        self.api.credentials().clear();
        self.user.clear();
        Ok(())
    }

    /// Claims for the current credential, if the provider answers.
    pub async fn claims(&self) -> Option<IdentityClaims> {
        let token = self.api.credentials().current()?;
        match self.chain.provider().user_info(&token).await {
            Ok(claims) => Some(claims),
            Err(err) => {
                warn!(error = %err, "could not load identity claims");
                None
            }
        }
    }

    async fn after_acquisition(&self) -> Option<String> {
        let email = match self.user.email() {
            Some(email) => email,
            None => self.claims().await?.email?,
        };
        self.user.set(email.clone());
        self.remember_email(&email);

        match self.api.register(&email).await {
            Ok(registered) => info!(%email, message = %registered.message, "user registered"),
            Err(err) => warn!(%email, error = %err, "user registration failed"),
        }
        Some(email)
    }

    fn remember_email(&self, email: &str) {
        let store = self.chain.store();
        let Ok(Some(mut credential)) = store.load() else {
            return;
        };
        if credential.email.as_deref() == Some(email) {
            return;
        }
        credential.email = Some(email.to_owned());
        if let Err(err) = store.save(&credential) {
            warn!(error = %err, "could not remember signed-in email");
        }
    }
}
