//! Ordered credential acquisition.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::token_store::{StoredCredential, TokenStore};
use super::{IdentityProvider, IssuedToken};
use crate::context::CredentialSlot;

/// One attempt in the acquisition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStep {
    /// Silent retrieval scoped to the API audience.
    SilentWithAudience,
    /// Silent retrieval without an audience.
    SilentWithoutAudience,
    /// Interactive login scoped to the API audience.
    InteractiveWithAudience,
    /// Interactive login without an audience.
    InteractiveWithoutAudience,
}

impl CredentialStep {
    const SILENT: [Self; 2] = [Self::SilentWithAudience, Self::SilentWithoutAudience];
    const INTERACTIVE: [Self; 2] = [
        Self::InteractiveWithAudience,
        Self::InteractiveWithoutAudience,
    ];

    fn scoped(self) -> bool {
        matches!(
            self,
            Self::SilentWithAudience | Self::InteractiveWithAudience
        )
    }

    fn interactive(self) -> bool {
        matches!(
            self,
            Self::InteractiveWithAudience | Self::InteractiveWithoutAudience
        )
    }
}

/// Result of running the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOutcome {
    /// A credential was stored; the step says which attempt produced it.
    Acquired(CredentialStep),
    /// Every attempt failed; calls proceed without a credential.
    Degraded,
}

impl CredentialOutcome {
    /// Whether a credential was stored.
    #[must_use]
    pub fn is_acquired(self) -> bool {
        matches!(self, Self::Acquired(_))
    }
}

/// Runs silent then interactive retrieval and stores the first success.
#[derive(Clone)]
pub struct CredentialChain {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn TokenStore>,
    slot: CredentialSlot,
    audience: Option<String>,
}

impl CredentialChain {
    /// Blank audiences are treated as absent.
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn TokenStore>,
        slot: CredentialSlot,
        audience: Option<String>,
    ) -> Self {
        Self {
            provider,
            store,
            slot,
            audience: audience.filter(|value| !value.trim().is_empty()),
        }
    }

    pub(crate) fn provider(&self) -> &dyn IdentityProvider {
        self.provider.as_ref()
    }

    pub(crate) fn store(&self) -> &dyn TokenStore {
        self.store.as_ref()
    }

    /// Load a previously stored credential into the shared slot.
    pub fn restore(&self) -> Option<StoredCredential> {
        match self.store.load() {
            Ok(Some(credential)) => {
                self.slot.set(credential.access_token.clone());
                debug!("restored stored credential");
                Some(credential)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "stored credential unreadable; ignoring it");
                None
            }
        }
    }

    /// Silent retrieval with then without the audience; interactive
    /// retrieval follows only when a login session already exists.
    pub async fn acquire(&self) -> CredentialOutcome {
        let mut steps = CredentialStep::SILENT.to_vec();
        if self.provider.is_authenticated() {
            steps.extend(CredentialStep::INTERACTIVE);
        }
        self.run(&steps).await
    }

    /// Interactive retrieval for an explicit login action.
    pub async fn login(&self) -> CredentialOutcome {
        self.run(&CredentialStep::INTERACTIVE).await
    }

    async fn run(&self, steps: &[CredentialStep]) -> CredentialOutcome {
        for &step in steps {
            let audience = if step.scoped() {
                let Some(audience) = self.audience.as_deref() else {
                    continue;
                };
                Some(audience)
            } else {
                None
            };
            let attempt = if step.interactive() {
                self.provider.interactive_token(audience).await
            } else {
                self.provider.silent_token(audience).await
            };
            match attempt {
                Ok(token) => {
                    self.persist(token);
                    info!(?step, "credential acquired");
                    return CredentialOutcome::Acquired(step);
                }
                Err(err) => warn!(?step, error = %err, "credential step failed"),
            }
        }
        warn!("no credential available; continuing without one");
        CredentialOutcome::Degraded
    }

    fn persist(&self, token: IssuedToken) {
        let previous = self.store.load().ok().flatten();
        let credential = StoredCredential {
            access_token: token.access_token,
            refresh_token: token
                .refresh_token
                .or_else(|| previous.as_ref().and_then(|p| p.refresh_token.clone())),
            email: previous.and_then(|p| p.email),
        };
        self.slot.set(credential.access_token.clone());
        if let Err(err) = self.store.save(&credential) {
            warn!(error = %err, "credential acquired but could not be stored");
        }
    }
}
