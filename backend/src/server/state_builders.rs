//! Builders wiring Diesel adapters into the HTTP state ports.

use std::sync::Arc;

use mockable::Clock;

use rental_backend::domain::{ResidencyService, UserAccountService};
use rental_backend::inbound::http::state::HttpState;
use rental_backend::outbound::persistence::{
    DbPool, DieselResidencyRepository, DieselUserRepository,
};

/// Services backed by PostgreSQL.
pub struct PersistentServices {
    pub residencies: Arc<DieselResidencyRepository>,
    pub residency_service: Arc<ResidencyService<DieselResidencyRepository, DieselUserRepository>>,
    pub http_state: HttpState,
}

/// Build the residency and user services over `pool`.
pub fn build_persistent_services(pool: &DbPool, clock: Arc<dyn Clock>) -> PersistentServices {
    let residencies = Arc::new(DieselResidencyRepository::new(pool.clone()));
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let residency_service = Arc::new(ResidencyService::new(
        residencies.clone(),
        users.clone(),
        clock.clone(),
    ));
    let user_service = Arc::new(UserAccountService::new(users, clock));
    let http_state = HttpState::new(
        residency_service.clone(),
        residency_service.clone(),
        user_service.clone(),
        user_service,
    );
    PersistentServices {
        residencies,
        residency_service,
        http_state,
    }
}
