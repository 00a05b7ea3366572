//! PostgreSQL-backed `ResidencyRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{ResidencyRepository, ResidencyRepositoryError};
use crate::domain::{EmailAddress, NewResidency, Residency, ResidencyId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{NewResidencyRow, ResidencyRow};
use super::pool::{DbPool, PoolError};
use super::schema::residencies;

/// Diesel-backed implementation of the `ResidencyRepository` port.
#[derive(Clone)]
pub struct DieselResidencyRepository {
    pool: DbPool,
}

impl DieselResidencyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ResidencyRepositoryError {
    ResidencyRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> ResidencyRepositoryError {
    match classify_diesel_error(&error) {
        DieselFailure::Connection(message) => ResidencyRepositoryError::connection(message),
        DieselFailure::UniqueViolation(constraint) => {
            ResidencyRepositoryError::duplicate(constraint)
        }
        DieselFailure::Query(message) => ResidencyRepositoryError::query(message),
    }
}

fn row_to_residency(row: ResidencyRow) -> Result<Residency, ResidencyRepositoryError> {
    let owner_email = EmailAddress::new(&row.owner_email).map_err(|err| {
        warn!(residency_id = %row.id, error = %err, "stored owner email is invalid");
        ResidencyRepositoryError::query(format!("invalid owner email on residency {}", row.id))
    })?;
    Ok(Residency {
        id: ResidencyId::from_uuid(row.id),
        title: row.title,
        description: row.description,
        price: row.price,
        address: row.address,
        city: row.city,
        country: row.country,
        image: row.image,
        facilities: row.facilities,
        owner_email,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl ResidencyRepository for DieselResidencyRepository {
    async fn insert(
        &self,
        residency: &NewResidency,
        created_at: DateTime<Utc>,
    ) -> Result<Residency, ResidencyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewResidencyRow {
            title: &residency.title,
            description: &residency.description,
            price: residency.price,
            address: &residency.address,
            city: &residency.city,
            country: &residency.country,
            image: &residency.image,
            facilities: &residency.facilities,
            owner_email: residency.owner_email.as_ref(),
            created_at,
            updated_at: created_at,
        };

        let row: ResidencyRow = diesel::insert_into(residencies::table)
            .values(&new_row)
            .returning(ResidencyRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_residency(row)
    }

    async fn list_newest_first(&self) -> Result<Vec<Residency>, ResidencyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ResidencyRow> = residencies::table
            .select(ResidencyRow::as_select())
            .order((residencies::created_at.desc(), residencies::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_residency).collect()
    }

    async fn find_by_id(
        &self,
        id: &ResidencyId,
    ) -> Result<Option<Residency>, ResidencyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ResidencyRow> = residencies::table
            .filter(residencies::id.eq(id.as_uuid()))
            .select(ResidencyRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_residency).transpose()
    }

    async fn count(&self) -> Result<u64, ResidencyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = residencies::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        u64::try_from(total).map_err(|_| ResidencyRepositoryError::query("negative row count"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for residency error mapping.
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    #[test]
    fn unique_violation_maps_to_duplicate() {
        let error = map_diesel_error(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_owned()),
        ));
        assert!(matches!(error, ResidencyRepositoryError::Duplicate { .. }));
    }

    #[test]
    fn pool_failures_map_to_connection_errors() {
        let error = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(error, ResidencyRepositoryError::connection("timed out"));
    }

    #[test]
    fn corrupt_owner_email_is_a_query_error() {
        let now = Utc::now();
        let row = ResidencyRow {
            id: uuid::Uuid::new_v4(),
            title: "Loft".to_owned(),
            description: String::new(),
            price: 1200,
            address: String::new(),
            city: String::new(),
            country: String::new(),
            image: String::new(),
            facilities: Vec::new(),
            owner_email: "not-an-email".to_owned(),
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(
            row_to_residency(row),
            Err(ResidencyRepositoryError::Query { .. })
        ));
    }
}
