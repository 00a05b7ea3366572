//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Bookings and favourites live in their own tables keyed by
//! `(user_email, residency_id)`, so uniqueness is enforced by the primary key
//! and every mutation is one conditional statement. The favourite toggle runs
//! its delete-then-insert inside a transaction.

use std::collections::BTreeSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{
    Booking, EmailAddress, EnsuredUser, FavouriteToggle, ProfileUpdate, ResidencyId, User,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{
    BookedVisitRow, NewBookedVisitRow, NewFavouriteRow, NewUserRow, UserProfileChangeset, UserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{booked_visits, favourite_residencies, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    UserRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    match classify_diesel_error(&error) {
        DieselFailure::Connection(message) => UserRepositoryError::connection(message),
        DieselFailure::UniqueViolation(constraint) => {
            UserRepositoryError::query(format!("unexpected unique violation on {constraint}"))
        }
        DieselFailure::Query(message) => UserRepositoryError::query(message),
    }
}

fn row_to_booking(row: BookedVisitRow) -> Booking {
    Booking {
        residency_id: ResidencyId::from_uuid(row.residency_id),
        date: row.visit_date,
    }
}

async fn load_bookings(
    conn: &mut AsyncPgConnection,
    email: &str,
) -> Result<Vec<Booking>, diesel::result::Error> {
    let rows: Vec<BookedVisitRow> = booked_visits::table
        .filter(booked_visits::user_email.eq(email))
        .order(booked_visits::booked_at.asc())
        .select(BookedVisitRow::as_select())
        .load(conn)
        .await?;
    Ok(rows.into_iter().map(row_to_booking).collect())
}

async fn load_favourites(
    conn: &mut AsyncPgConnection,
    email: &str,
) -> Result<BTreeSet<ResidencyId>, diesel::result::Error> {
    let ids: Vec<Uuid> = favourite_residencies::table
        .filter(favourite_residencies::user_email.eq(email))
        .select(favourite_residencies::residency_id)
        .load(conn)
        .await?;
    Ok(ids.into_iter().map(ResidencyId::from_uuid).collect())
}

async fn load_user(
    conn: &mut AsyncPgConnection,
    email: &EmailAddress,
) -> Result<Option<User>, diesel::result::Error> {
    let row: Option<UserRow> = users::table
        .filter(users::email.eq(email.as_ref()))
        .select(UserRow::as_select())
        .first(conn)
        .await
        .optional()?;
    let Some(row) = row else {
        return Ok(None);
    };

    let booked_visits = load_bookings(conn, email.as_ref()).await?;
    let favourite_residency_ids = load_favourites(conn, email.as_ref()).await?;
    Ok(Some(User {
        email: email.clone(),
        name: row.name,
        gender: row.gender,
        phone: row.phone,
        image: row.image,
        booked_visits,
        favourite_residency_ids,
    }))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn ensure(&self, email: &EmailAddress) -> Result<EnsuredUser, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let inserted = diesel::insert_into(users::table)
            .values(&NewUserRow {
                email: email.as_ref(),
                name: email.local_part(),
            })
            .on_conflict(users::email)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let user = load_user(&mut conn, email)
            .await
            .map_err(map_diesel_error)?
            .ok_or_else(|| UserRepositoryError::query("user missing after ensure"))?;
        Ok(EnsuredUser {
            user,
            created: inserted > 0,
        })
    }

    async fn find(&self, email: &EmailAddress) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_user(&mut conn, email).await.map_err(map_diesel_error)
    }

    async fn update_profile(
        &self,
        email: &EmailAddress,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        if !update.is_empty() {
            let changeset = UserProfileChangeset {
                name: update.name.as_deref(),
                gender: update.gender.as_deref(),
                phone: update.phone.as_deref(),
                image: update.image.as_deref(),
            };
            let updated = diesel::update(users::table.filter(users::email.eq(email.as_ref())))
                .set(&changeset)
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            if updated == 0 {
                return Ok(None);
            }
        }

        load_user(&mut conn, email).await.map_err(map_diesel_error)
    }

    async fn insert_booking(
        &self,
        email: &EmailAddress,
        booking: &Booking,
    ) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let inserted = diesel::insert_into(booked_visits::table)
            .values(&NewBookedVisitRow {
                user_email: email.as_ref(),
                residency_id: *booking.residency_id.as_uuid(),
                visit_date: booking.date,
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn delete_booking(
        &self,
        email: &EmailAddress,
        residency_id: &ResidencyId,
    ) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            booked_visits::table
                .filter(booked_visits::user_email.eq(email.as_ref()))
                .filter(booked_visits::residency_id.eq(residency_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list_bookings(
        &self,
        email: &EmailAddress,
    ) -> Result<Vec<Booking>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_bookings(&mut conn, email.as_ref())
            .await
            .map_err(map_diesel_error)
    }

    async fn toggle_favourite(
        &self,
        email: &EmailAddress,
        residency_id: &ResidencyId,
    ) -> Result<FavouriteToggle, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_email = email.as_ref();
        let residency_uuid = *residency_id.as_uuid();

        let toggle = conn
            .transaction(|conn| {
                async move {
                    let removed = diesel::delete(
                        favourite_residencies::table
                            .filter(favourite_residencies::user_email.eq(user_email))
                            .filter(favourite_residencies::residency_id.eq(residency_uuid)),
                    )
                    .execute(conn)
                    .await?;

                    if removed == 0 {
                        diesel::insert_into(favourite_residencies::table)
                            .values(&NewFavouriteRow {
                                user_email,
                                residency_id: residency_uuid,
                            })
                            .on_conflict_do_nothing()
                            .execute(conn)
                            .await?;
                    }

                    let favourites = load_favourites(conn, user_email).await?;
                    Ok::<_, diesel::result::Error>(FavouriteToggle {
                        added: removed == 0,
                        favourites,
                    })
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        debug!(%email, %residency_id, added = toggle.added, "favourite toggled");
        Ok(toggle)
    }

    async fn list_favourites(
        &self,
        email: &EmailAddress,
    ) -> Result<BTreeSet<ResidencyId>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_favourites(&mut conn, email.as_ref())
            .await
            .map_err(map_diesel_error)
    }
}
