//! PostgreSQL-backed `BookingRepository` implementation using Diesel ORM.
//!
//! The one-booking cap is enforced by the `bookings_one_per_user` partial
//! unique index, so concurrent inserts for the same user cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{BookingRepository, BookingRepositoryError};
use crate::domain::{
    Booking, BookingId, BookingScope, BookingView, DentistId, DentistSummary, UserBookingEntry,
    UserId,
};

use super::diesel_basic_error_mapping::{
    ConstraintKind, map_basic_diesel_error, map_basic_pool_error, violated_constraint,
};
use super::models::{BookingChangeset, BookingRow, DentistSummaryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{bookings, dentists};

const ONE_PER_USER_INDEX: &str = "bookings_one_per_user";
const DENTIST_FOREIGN_KEY: &str = "bookings_dentist_id_fkey";

/// Diesel-backed implementation of the `BookingRepository` port.
#[derive(Clone)]
pub struct DieselBookingRepository {
    pool: DbPool,
}

impl DieselBookingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BookingRepositoryError {
    map_basic_pool_error(error, BookingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> BookingRepositoryError {
    map_basic_diesel_error(
        error,
        BookingRepositoryError::query,
        BookingRepositoryError::connection,
    )
}

/// Map write failures, recognising the cap index and the dentist foreign key.
fn map_write_error(error: diesel::result::Error, booking: &Booking) -> BookingRepositoryError {
    match violated_constraint(&error) {
        Some((ConstraintKind::Unique, ONE_PER_USER_INDEX)) => {
            BookingRepositoryError::duplicate_booking(booking.user.to_string())
        }
        Some((ConstraintKind::ForeignKey, DENTIST_FOREIGN_KEY)) => {
            BookingRepositoryError::dentist_missing(booking.dentist.to_string())
        }
        _ => map_diesel_error(error),
    }
}

fn booking_to_row(booking: &Booking) -> BookingRow {
    BookingRow {
        id: *booking.id.as_uuid(),
        booking_date: booking.booking_date,
        user_id: *booking.user.as_uuid(),
        dentist_id: *booking.dentist.as_uuid(),
        cap_exempt: booking.cap_exempt,
        created_at: booking.created_at,
    }
}

fn rows_to_view((booking, dentist): (BookingRow, DentistSummaryRow)) -> BookingView {
    BookingView {
        booking: Booking {
            id: BookingId::from_uuid(booking.id),
            booking_date: booking.booking_date,
            user: UserId::from_uuid(booking.user_id),
            dentist: DentistId::from_uuid(booking.dentist_id),
            cap_exempt: booking.cap_exempt,
            created_at: booking.created_at,
        },
        dentist: DentistSummary {
            id: DentistId::from_uuid(dentist.id),
            name: dentist.name,
            experience_years: dentist.experience_years,
            expertise: dentist.expertise,
        },
    }
}

async fn load_view(
    conn: &mut AsyncPgConnection,
    id: &Uuid,
) -> Result<Option<BookingView>, BookingRepositoryError> {
    let row: Option<(BookingRow, DentistSummaryRow)> = bookings::table
        .inner_join(dentists::table)
        .filter(bookings::id.eq(id))
        .select((BookingRow::as_select(), DentistSummaryRow::as_select()))
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    Ok(row.map(rows_to_view))
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<BookingView, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(bookings::table)
            .values(&booking_to_row(booking))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, booking))?;
        load_view(&mut conn, booking.id.as_uuid())
            .await?
            .ok_or_else(|| BookingRepositoryError::query("inserted booking could not be read back"))
    }

    async fn find_by_id(
        &self,
        id: &BookingId,
    ) -> Result<Option<BookingView>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_view(&mut conn, id.as_uuid()).await
    }

    async fn list(&self, scope: BookingScope) -> Result<Vec<BookingView>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = bookings::table
            .inner_join(dentists::table)
            .select((BookingRow::as_select(), DentistSummaryRow::as_select()))
            .order((bookings::created_at.asc(), bookings::id.asc()))
            .into_boxed();
        query = match scope {
            BookingScope::Owner(user) => query.filter(bookings::user_id.eq(*user.as_uuid())),
            BookingScope::All {
                dentist: Some(dentist),
            } => query.filter(bookings::dentist_id.eq(*dentist.as_uuid())),
            BookingScope::All { dentist: None } => query,
        };
        let rows: Vec<(BookingRow, DentistSummaryRow)> =
            query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(rows_to_view).collect())
    }

    async fn update(
        &self,
        booking: &Booking,
    ) -> Result<Option<BookingView>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = BookingChangeset {
            booking_date: booking.booking_date,
            dentist_id: *booking.dentist.as_uuid(),
        };
        let updated = diesel::update(bookings::table.find(booking.id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, booking))?;
        if updated == 0 {
            return Ok(None);
        }
        load_view(&mut conn, booking.id.as_uuid()).await
    }

    async fn delete(&self, id: &BookingId) -> Result<bool, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(bookings::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn delete_for_dentist(&self, dentist: &DentistId) -> Result<u64, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(bookings::table.filter(bookings::dentist_id.eq(dentist.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted as u64)
    }

    async fn list_for_users(
        &self,
        users: &[UserId],
    ) -> Result<Vec<(UserId, UserBookingEntry)>, BookingRepositoryError> {
        if users.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<Uuid> = users.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<(Uuid, Uuid, DateTime<Utc>, Uuid, String)> = bookings::table
            .inner_join(dentists::table)
            // Postgres receives the ids as one array bind: `user_id = ANY($1)`.
            .filter(bookings::user_id.eq_any(ids))
            .order((bookings::created_at.asc(), bookings::id.asc()))
            .select((
                bookings::user_id,
                bookings::id,
                bookings::booking_date,
                dentists::id,
                dentists::name,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(user, id, booking_date, dentist_id, dentist_name)| {
                (
                    UserId::from_uuid(user),
                    UserBookingEntry {
                        id: BookingId::from_uuid(id),
                        booking_date,
                        dentist_id: DentistId::from_uuid(dentist_id),
                        dentist_name,
                    },
                )
            })
            .collect())
    }
}
