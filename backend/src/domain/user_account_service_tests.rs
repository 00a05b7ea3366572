//! Tests for the user account service.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use std::sync::Arc;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::MockUserRepository;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockall::predicate::eq;
use rstest::rstest;

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 17, 23, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn make_service(repo: MockUserRepository) -> UserAccountService<MockUserRepository> {
    UserAccountService::new(
        Arc::new(repo),
        Arc::new(FixtureClock {
            utc_now: fixture_timestamp(),
        }),
    )
}

fn email() -> EmailAddress {
    EmailAddress::new("a@x.com").expect("valid email")
}

fn ensured(created: bool) -> EnsuredUser {
    EnsuredUser {
        user: User::stub(email()),
        created,
    }
}

fn expect_ensure(repo: &mut MockUserRepository, created: bool) {
    repo.expect_ensure()
        .with(eq(email()))
        .times(1)
        .return_once(move |_| Ok(ensured(created)));
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn register_reports_whether_record_was_created(#[case] created: bool) {
    let mut repo = MockUserRepository::new();
    expect_ensure(&mut repo, created);

    let outcome = make_service(repo)
        .register(&email())
        .await
        .expect("register succeeds");
    assert_eq!(outcome.created, created);
    assert_eq!(outcome.user.name, "a");
}

#[tokio::test]
async fn booking_without_date_uses_clock_day() {
    let residency_id = ResidencyId::random();
    let mut repo = MockUserRepository::new();
    expect_ensure(&mut repo, false);
    repo.expect_insert_booking()
        .withf(move |_, booking| {
            booking.residency_id == residency_id
                && booking.date == NaiveDate::from_ymd_opt(2024, 5, 17).expect("date")
        })
        .times(1)
        .return_once(|_, _| Ok(true));

    let booking = make_service(repo)
        .book_visit(&email(), residency_id, None)
        .await
        .expect("booking succeeds");
    assert_eq!(booking.residency_id, residency_id);
}

#[tokio::test]
async fn duplicate_booking_is_a_conflict() {
    let mut repo = MockUserRepository::new();
    expect_ensure(&mut repo, false);
    repo.expect_insert_booking()
        .times(1)
        .return_once(|_, _| Ok(false));

    let date = NaiveDate::from_ymd_opt(2024, 6, 1).expect("date");
    let error = make_service(repo)
        .book_visit(&email(), ResidencyId::random(), Some(date))
        .await
        .expect_err("second booking rejected");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "Already booked");
}

#[tokio::test]
async fn cancelling_missing_booking_is_not_found() {
    let mut repo = MockUserRepository::new();
    expect_ensure(&mut repo, true);
    repo.expect_delete_booking()
        .times(1)
        .return_once(|_, _| Ok(false));

    let error = make_service(repo)
        .cancel_booking(&email(), &ResidencyId::random())
        .await
        .expect_err("nothing to cancel");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "Not booked");
}

#[tokio::test]
async fn cancelling_existing_booking_succeeds() {
    let mut repo = MockUserRepository::new();
    expect_ensure(&mut repo, false);
    repo.expect_delete_booking()
        .times(1)
        .return_once(|_, _| Ok(true));

    make_service(repo)
        .cancel_booking(&email(), &ResidencyId::random())
        .await
        .expect("cancel succeeds");
}

#[tokio::test]
async fn toggle_passes_repository_outcome_through() {
    let residency_id = ResidencyId::random();
    let mut repo = MockUserRepository::new();
    expect_ensure(&mut repo, true);
    repo.expect_toggle_favourite()
        .with(eq(email()), eq(residency_id))
        .times(1)
        .return_once(move |_, id| {
            Ok(FavouriteToggle {
                added: true,
                favourites: BTreeSet::from([*id]),
            })
        });

    let toggle = make_service(repo)
        .toggle_favourite(&email(), &residency_id)
        .await
        .expect("toggle succeeds");
    assert!(toggle.added);
    assert!(toggle.favourites.contains(&residency_id));
}

#[tokio::test]
async fn blank_profile_update_skips_the_write() {
    let mut repo = MockUserRepository::new();
    expect_ensure(&mut repo, false);
    repo.expect_update_profile().never();

    let user = make_service(repo)
        .update_profile(
            &email(),
            ProfileUpdate {
                name: Some("  ".to_owned()),
                ..ProfileUpdate::default()
            },
        )
        .await
        .expect("update succeeds");
    assert_eq!(user.name, "a");
}

#[tokio::test]
async fn profile_update_sends_normalised_fields() {
    let mut repo = MockUserRepository::new();
    expect_ensure(&mut repo, false);
    repo.expect_update_profile()
        .withf(|_, update| update.phone.as_deref() == Some("555") && update.name.is_none())
        .times(1)
        .return_once(|_, update| {
            let mut user = User::stub(email());
            update.apply_to(&mut user);
            Ok(Some(user))
        });

    let user = make_service(repo)
        .update_profile(
            &email(),
            ProfileUpdate {
                name: Some(String::new()),
                phone: Some(" 555 ".to_owned()),
                ..ProfileUpdate::default()
            },
        )
        .await
        .expect("update succeeds");
    assert_eq!(user.phone.as_deref(), Some("555"));
    assert_eq!(user.name, "a");
}

#[rstest]
#[case(UserRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserRepositoryError::query("boom"), ErrorCode::InternalError)]
#[tokio::test]
async fn ensure_failures_abort_the_operation(
    #[case] failure: UserRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_ensure()
        .times(1)
        .return_once(move |_| Err(failure));
    repo.expect_insert_booking().never();

    let error = make_service(repo)
        .book_visit(&email(), ResidencyId::random(), None)
        .await
        .expect_err("ensure fails");
    assert_eq!(error.code(), expected);
}

#[tokio::test]
async fn queries_do_not_provision_users() {
    let mut repo = MockUserRepository::new();
    repo.expect_ensure().never();
    repo.expect_list_bookings()
        .times(1)
        .return_once(|_| Ok(Vec::new()));
    repo.expect_list_favourites()
        .times(1)
        .return_once(|_| Ok(BTreeSet::new()));

    let service = make_service(repo);
    assert!(service.list_bookings(&email()).await.expect("bookings").is_empty());
    assert!(
        service
            .list_favourites(&email())
            .await
            .expect("favourites")
            .is_empty()
    );
}
