//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see the driving ports,
//! so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureResidencyCommand, FixtureResidencyQuery, FixtureUserCommand, FixtureUserQuery,
    ResidencyCommand, ResidencyQuery, UserCommand, UserQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Listing writes.
    pub residencies: Arc<dyn ResidencyCommand>,
    /// Listing reads.
    pub residencies_query: Arc<dyn ResidencyQuery>,
    /// User writes.
    pub users: Arc<dyn UserCommand>,
    /// User reads.
    pub users_query: Arc<dyn UserQuery>,
}

impl HttpState {
    /// Bundle the four driving ports.
    pub fn new(
        residencies: Arc<dyn ResidencyCommand>,
        residencies_query: Arc<dyn ResidencyQuery>,
        users: Arc<dyn UserCommand>,
        users_query: Arc<dyn UserQuery>,
    ) -> Self {
        Self {
            residencies,
            residencies_query,
            users,
            users_query,
        }
    }

    /// State backed entirely by the fixture ports.
    ///
    /// # Examples
    /// ```
    /// use rental_backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::fixtures();
    /// let _users = state.users.clone();
    /// ```
    #[must_use]
    pub fn fixtures() -> Self {
        Self::new(
            Arc::new(FixtureResidencyCommand),
            Arc::new(FixtureResidencyQuery),
            Arc::new(FixtureUserCommand),
            Arc::new(FixtureUserQuery),
        )
    }
}

#[cfg(any(test, feature = "test-support"))]
mod in_memory {
    use std::sync::Arc;

    use mockable::Clock;

    use super::HttpState;
    use crate::domain::{ResidencyService, UserAccountService};
    use crate::outbound::memory::InMemoryStore;

    impl HttpState {
        /// Real services over a shared in-memory store.
        pub fn in_memory(store: Arc<InMemoryStore>, clock: Arc<dyn Clock>) -> Self {
            let residencies = Arc::new(ResidencyService::new(
                store.clone(),
                store.clone(),
                clock.clone(),
            ));
            let users = Arc::new(UserAccountService::new(store, clock));
            Self::new(residencies.clone(), residencies, users.clone(), users)
        }
    }
}
