//! PostgreSQL-backed `DentistRepository` implementation using Diesel ORM.
//!
//! Listing translates a [`DentistListQuery`] into a boxed query so the same
//! filter set drives both the page fetch and the total count.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::Page;

use crate::domain::ports::{DentistRepository, DentistRepositoryError};
use crate::domain::{
    Comparison, Dentist, DentistDetails, DentistField, DentistFilter, DentistId,
    DentistListQuery, SortKey,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::DentistRow;
use super::pool::{DbPool, PoolError};
use super::schema::{bookings, dentists};

/// Diesel-backed implementation of the `DentistRepository` port.
#[derive(Clone)]
pub struct DieselDentistRepository {
    pool: DbPool,
}

impl DieselDentistRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DentistRepositoryError {
    map_basic_pool_error(error, DentistRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> DentistRepositoryError {
    map_basic_diesel_error(
        error,
        DentistRepositoryError::query,
        DentistRepositoryError::connection,
    )
}

fn row_to_dentist(row: DentistRow) -> Dentist {
    Dentist {
        id: DentistId::from_uuid(row.id),
        name: row.name,
        experience_years: row.experience_years,
        expertise: row.expertise,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn dentist_to_row(dentist: &Dentist) -> DentistRow {
    DentistRow {
        id: *dentist.id.as_uuid(),
        name: dentist.name.clone(),
        experience_years: dentist.experience_years,
        expertise: dentist.expertise.clone(),
        created_at: dentist.created_at,
        updated_at: dentist.updated_at,
    }
}

macro_rules! filter_by {
    ($query:expr, $column:expr, $comparison:expr) => {
        match $comparison.clone() {
            Comparison::Eq(value) => $query.filter($column.eq(value)),
            Comparison::Gt(value) => $query.filter($column.gt(value)),
            Comparison::Gte(value) => $query.filter($column.ge(value)),
            Comparison::Lt(value) => $query.filter($column.lt(value)),
            Comparison::Lte(value) => $query.filter($column.le(value)),
            Comparison::In(values) => $query.filter($column.eq_any(values)),
        }
    };
}

macro_rules! order_by {
    ($query:expr, $column:expr, $descending:expr) => {
        if $descending {
            $query.then_order_by($column.desc())
        } else {
            $query.then_order_by($column.asc())
        }
    };
}

fn apply_filters<'a, ST: 'a>(
    mut query: dentists::BoxedQuery<'a, Pg, ST>,
    filters: &[DentistFilter],
) -> dentists::BoxedQuery<'a, Pg, ST> {
    for filter in filters {
        query = match filter {
            DentistFilter::Name(cmp) => filter_by!(query, dentists::name, cmp),
            DentistFilter::ExperienceYears(cmp) => {
                filter_by!(query, dentists::experience_years, cmp)
            }
            DentistFilter::Expertise(cmp) => filter_by!(query, dentists::expertise, cmp),
            DentistFilter::CreatedAt(cmp) => filter_by!(query, dentists::created_at, cmp),
            DentistFilter::UpdatedAt(cmp) => filter_by!(query, dentists::updated_at, cmp),
        };
    }
    query
}

fn apply_sort<'a>(
    mut query: dentists::BoxedQuery<'a, Pg>,
    sort: &[SortKey],
) -> dentists::BoxedQuery<'a, Pg> {
    for key in sort {
        query = match key.field {
            DentistField::Id => order_by!(query, dentists::id, key.descending),
            DentistField::Name => order_by!(query, dentists::name, key.descending),
            DentistField::ExperienceYears => {
                order_by!(query, dentists::experience_years, key.descending)
            }
            DentistField::Expertise => order_by!(query, dentists::expertise, key.descending),
            DentistField::CreatedAt => order_by!(query, dentists::created_at, key.descending),
            DentistField::UpdatedAt => order_by!(query, dentists::updated_at, key.descending),
        };
    }
    // Stable paging across equal sort keys.
    query.then_order_by(dentists::id.asc())
}

fn to_sql_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl DentistRepository for DieselDentistRepository {
    async fn insert(&self, dentist: &Dentist) -> Result<(), DentistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(dentists::table)
            .values(&dentist_to_row(dentist))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &DentistId) -> Result<Option<Dentist>, DentistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = dentists::table
            .find(id.as_uuid())
            .select(DentistRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_dentist))
    }

    async fn find_details(
        &self,
        id: &DentistId,
    ) -> Result<Option<DentistDetails>, DentistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(row) = dentists::table
            .find(id.as_uuid())
            .select(DentistRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };
        let booking_count: i64 = bookings::table
            .filter(bookings::dentist_id.eq(id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Some(DentistDetails {
            dentist: row_to_dentist(row),
            booking_count: u64::try_from(booking_count).unwrap_or_default(),
        }))
    }

    async fn update(&self, dentist: &Dentist) -> Result<bool, DentistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(dentists::table.find(dentist.id.as_uuid()))
            .set(&dentist_to_row(dentist))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &DentistId) -> Result<bool, DentistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(dentists::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list(&self, query: &DentistListQuery) -> Result<Page<Dentist>, DentistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = apply_filters(dentists::table.into_boxed(), &query.filters)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let page_query = apply_filters(dentists::table.into_boxed(), &query.filters);
        let rows: Vec<DentistRow> = apply_sort(page_query, &query.sort)
            .limit(i64::from(query.page.limit()))
            .offset(to_sql_count(query.page.offset()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Page::new(
            rows.into_iter().map(row_to_dentist).collect(),
            u64::try_from(total).unwrap_or_default(),
            query.page,
        ))
    }
}
