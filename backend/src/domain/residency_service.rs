//! Residency use-cases.
//!
//! Creation validates the draft, makes sure the owner has a user record and
//! stamps the listing with the service clock before handing it to storage.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    ResidencyCommand, ResidencyQuery, ResidencyRepository, ResidencyRepositoryError,
    UserRepository,
};
use crate::domain::user_account_service::map_user_repository_error;
use crate::domain::{Error, Residency, ResidencyDraft, ResidencyId, ResidencyValidationError};

/// Translate draft validation failures into `invalid_request` errors whose
/// details name the field.
#[must_use]
pub fn residency_validation_error(error: ResidencyValidationError) -> Error {
    let mut details = json!({
        "field": error.field(),
        "code": error.code(),
    });
    if let (Some(value), Some(object)) = (error.value(), details.as_object_mut()) {
        object.insert("value".to_owned(), json!(value));
    }
    Error::invalid_request(error.to_string()).with_details(details)
}

fn map_residency_error(error: ResidencyRepositoryError) -> Error {
    match error {
        ResidencyRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("residency repository unavailable: {message}"))
        }
        ResidencyRepositoryError::Query { message } => {
            Error::internal(format!("residency repository error: {message}"))
        }
        ResidencyRepositoryError::Duplicate { message } => {
            Error::conflict("A residency with this address already exists")
                .with_details(json!({ "code": "duplicate_residency", "reason": message }))
        }
    }
}

/// Residency service implementing the residency driving ports.
#[derive(Clone)]
pub struct ResidencyService<R, U> {
    residencies: Arc<R>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<R, U> ResidencyService<R, U> {
    /// Create a new service over the given repositories.
    pub fn new(residencies: Arc<R>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            residencies,
            users,
            clock,
        }
    }
}

#[async_trait]
impl<R, U> ResidencyCommand for ResidencyService<R, U>
where
    R: ResidencyRepository,
    U: UserRepository,
{
    async fn create(&self, draft: ResidencyDraft) -> Result<Residency, Error> {
        let new = draft.validate().map_err(residency_validation_error)?;

        let owner = self
            .users
            .ensure(&new.owner_email)
            .await
            .map_err(map_user_repository_error)?;
        if owner.created {
            info!(email = %new.owner_email, "provisioned listing owner");
        }

        let residency = self
            .residencies
            .insert(&new, self.clock.utc())
            .await
            .map_err(map_residency_error)?;
        info!(
            residency_id = %residency.id,
            owner = %residency.owner_email,
            "residency created"
        );
        Ok(residency)
    }
}

#[async_trait]
impl<R, U> ResidencyQuery for ResidencyService<R, U>
where
    R: ResidencyRepository,
    U: UserRepository,
{
    async fn list_all(&self) -> Result<Vec<Residency>, Error> {
        self.residencies
            .list_newest_first()
            .await
            .map_err(map_residency_error)
    }

    async fn get_by_id(&self, id: &ResidencyId) -> Result<Residency, Error> {
        self.residencies
            .find_by_id(id)
            .await
            .map_err(map_residency_error)?
            .ok_or_else(|| Error::not_found("Residency not found"))
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "test code uses expect for clear failure messages")]
mod tests {
    use super::*;
    use crate::domain::ports::{MockResidencyRepository, MockUserRepository};
    use crate::domain::{EmailAddress, EnsuredUser, ErrorCode, NewResidency, User};
    use chrono::{DateTime, Local, TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;

    struct FixtureClock(DateTime<Utc>);

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn make_service(
        residencies: MockResidencyRepository,
        users: MockUserRepository,
    ) -> ResidencyService<MockResidencyRepository, MockUserRepository> {
        ResidencyService::new(
            Arc::new(residencies),
            Arc::new(users),
            Arc::new(FixtureClock(fixed_now())),
        )
    }

    fn stored(new: &NewResidency, created_at: DateTime<Utc>) -> Residency {
        Residency {
            id: ResidencyId::random(),
            title: new.title.clone(),
            description: new.description.clone(),
            price: new.price,
            address: new.address.clone(),
            city: new.city.clone(),
            country: new.country.clone(),
            image: new.image.clone(),
            facilities: new.facilities.clone(),
            owner_email: new.owner_email.clone(),
            created_at,
            updated_at: created_at,
        }
    }

    fn loft_draft() -> ResidencyDraft {
        serde_json::from_value(json!({
            "title": "Loft",
            "price": "1200",
            "userEmail": "a@x.com",
            "address": "1 Canal Street",
        }))
        .expect("draft")
    }

    fn ensured(created: bool) -> EnsuredUser {
        EnsuredUser {
            user: User::stub(EmailAddress::new("a@x.com").expect("email")),
            created,
        }
    }

    #[tokio::test]
    async fn create_ensures_owner_then_inserts_with_clock_time() {
        let mut users = MockUserRepository::new();
        users
            .expect_ensure()
            .withf(|email| email.as_ref() == "a@x.com")
            .times(1)
            .return_once(|_| Ok(ensured(true)));
        let mut residencies = MockResidencyRepository::new();
        residencies
            .expect_insert()
            .withf(|new, created_at| new.price == 1200 && *created_at == fixed_now())
            .times(1)
            .return_once(|new, created_at| Ok(stored(new, created_at)));

        let created = make_service(residencies, users)
            .create(loft_draft())
            .await
            .expect("create succeeds");
        assert_eq!(created.price, 1200);
        assert_eq!(created.created_at, fixed_now());
    }

    #[tokio::test]
    async fn create_rejects_invalid_price_before_touching_storage() {
        let draft = ResidencyDraft {
            price: Some(json!("about a grand")),
            ..loft_draft()
        };
        let error = make_service(MockResidencyRepository::new(), MockUserRepository::new())
            .create(draft)
            .await
            .expect_err("invalid price");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        let details = error.details().expect("details");
        assert_eq!(details.get("field"), Some(&json!("price")));
        assert_eq!(details.get("code"), Some(&json!("invalid_price")));
        assert_eq!(details.get("value"), Some(&json!("about a grand")));
    }

    #[rstest]
    #[case(
        ResidencyRepositoryError::duplicate("residencies_address_owner_key"),
        ErrorCode::Conflict
    )]
    #[case(ResidencyRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(ResidencyRepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn create_maps_storage_failures(
        #[case] failure: ResidencyRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut users = MockUserRepository::new();
        users
            .expect_ensure()
            .times(1)
            .return_once(|_| Ok(ensured(false)));
        let mut residencies = MockResidencyRepository::new();
        residencies
            .expect_insert()
            .times(1)
            .return_once(move |_, _| Err(failure));

        let error = make_service(residencies, users)
            .create(loft_draft())
            .await
            .expect_err("storage failure");
        assert_eq!(error.code(), expected);
    }

    #[tokio::test]
    async fn get_by_id_reports_missing_listing() {
        let mut residencies = MockResidencyRepository::new();
        residencies
            .expect_find_by_id()
            .times(1)
            .return_once(|_| Ok(None));

        let error = make_service(residencies, MockUserRepository::new())
            .get_by_id(&ResidencyId::random())
            .await
            .expect_err("missing");
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), "Residency not found");
    }
}
