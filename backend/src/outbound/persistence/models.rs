//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{booked_visits, favourite_residencies, residencies, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub email: String,
    pub name: String,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
}

/// Insertable stub user created by the ensure step.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub email: &'a str,
    pub name: &'a str,
}

/// Partial profile update; `None` columns are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserProfileChangeset<'a> {
    pub name: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub image: Option<&'a str>,
}

/// Row struct for reading from the residencies table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = residencies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ResidencyRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: i32,
    pub address: String,
    pub city: String,
    pub country: String,
    pub image: String,
    pub facilities: Vec<String>,
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable listing; the identifier comes from the column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = residencies)]
pub(crate) struct NewResidencyRow<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub price: i32,
    pub address: &'a str,
    pub city: &'a str,
    pub country: &'a str,
    pub image: &'a str,
    pub facilities: &'a [String],
    pub owner_email: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading bookings.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = booked_visits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookedVisitRow {
    pub residency_id: Uuid,
    pub visit_date: NaiveDate,
}

/// Insertable booking; `booked_at` comes from the column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = booked_visits)]
pub(crate) struct NewBookedVisitRow<'a> {
    pub user_email: &'a str,
    pub residency_id: Uuid,
    pub visit_date: NaiveDate,
}

/// Insertable favourite membership.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = favourite_residencies)]
pub(crate) struct NewFavouriteRow<'a> {
    pub user_email: &'a str,
    pub residency_id: Uuid,
}
