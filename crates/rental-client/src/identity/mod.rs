//! Identity integration: turning a federated login into a bearer credential.
//!
//! An [`IdentityProvider`] offers silent and interactive token retrieval,
//! each optionally scoped to an API audience. [`CredentialChain`] tries them
//! in a fixed order and stores the first credential it gets; when every step
//! fails the outcome is [`CredentialOutcome::Degraded`] and callers carry on
//! without a credential.

mod chain;
mod oauth;
mod session;
mod token_store;

pub use chain::{CredentialChain, CredentialOutcome, CredentialStep};
pub use oauth::{DeviceCodePrompt, OAuthConfig, OAuthIdentityProvider};
pub use session::Session;
pub use token_store::{
    FileTokenStore, MemoryTokenStore, StoredCredential, TokenStore, TokenStoreError,
    credential_file_in,
};

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use crate::presentation::IdentityClaims;

/// Failures reported by an identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No session exists that could be renewed silently.
    #[error("login required")]
    LoginRequired,
    /// The provider refused the grant (unknown audience, consent missing, ...).
    #[error("identity provider rejected the request: {error}: {description}")]
    Rejected {
        /// OAuth error code.
        error: String,
        /// Provider-supplied detail; may be empty.
        description: String,
    },
    /// Interactive authorisation was not completed in time.
    #[error("interactive login expired before it was completed")]
    Expired,
    /// Transport failure talking to the provider.
    #[error("identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    /// The provider is not configured.
    #[error("identity provider is not configured: {0}")]
    NotConfigured(String),
    /// Stored credentials could not be read.
    #[error(transparent)]
    Store(#[from] TokenStoreError),
}

/// A credential freshly issued by a provider.
#[derive(Clone)]
pub struct IssuedToken {
    /// Bearer token for API calls.
    pub access_token: SecretString,
    /// Token for later silent renewal.
    pub refresh_token: Option<SecretString>,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish_non_exhaustive()
    }
}

/// Source of bearer credentials for the signed-in user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Obtain a token without user interaction.
    async fn silent_token(&self, audience: Option<&str>) -> Result<IssuedToken, IdentityError>;

    /// Obtain a token with user interaction.
    async fn interactive_token(&self, audience: Option<&str>)
    -> Result<IssuedToken, IdentityError>;

    /// Whether a login session already exists.
    fn is_authenticated(&self) -> bool;

    /// Claims describing the user the token belongs to.
    async fn user_info(&self, access_token: &SecretString)
    -> Result<IdentityClaims, IdentityError>;
}
