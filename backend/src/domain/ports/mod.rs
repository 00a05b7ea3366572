//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`) are what inbound adapters call.
//! Driven ports (`*Repository`) are what the services call and outbound
//! adapters implement.

mod macros;
pub(crate) use macros::define_port_error;

mod residency_command;
mod residency_query;
mod residency_repository;
mod user_command;
mod user_query;
mod user_repository;

#[cfg(test)]
pub use residency_command::MockResidencyCommand;
pub use residency_command::{FixtureResidencyCommand, ResidencyCommand};
#[cfg(test)]
pub use residency_query::MockResidencyQuery;
pub use residency_query::{
    FIXTURE_RESIDENCY_ID, FixtureResidencyQuery, ResidencyQuery, fixture_residency,
};
#[cfg(test)]
pub use residency_repository::MockResidencyRepository;
pub use residency_repository::{ResidencyRepository, ResidencyRepositoryError};
#[cfg(test)]
pub use user_command::MockUserCommand;
pub use user_command::{FixtureUserCommand, UserCommand};
#[cfg(test)]
pub use user_query::MockUserQuery;
pub use user_query::{FixtureUserQuery, UserQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
