//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer; repositories convert them
//! into domain records before returning.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{bookings, dentists, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub telephone_number: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub telephone_number: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Profile changeset; `None` columns are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserProfileChangeset<'a> {
    pub name: Option<&'a str>,
    pub telephone_number: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = dentists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DentistRow {
    pub id: Uuid,
    pub name: String,
    pub experience_years: i32,
    pub expertise: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dentist columns joined onto bookings.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = dentists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DentistSummaryRow {
    pub id: Uuid,
    pub name: String,
    pub experience_years: i32,
    pub expertise: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookingRow {
    pub id: Uuid,
    pub booking_date: DateTime<Utc>,
    pub user_id: Uuid,
    pub dentist_id: Uuid,
    pub cap_exempt: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = bookings)]
pub(crate) struct BookingChangeset {
    pub booking_date: DateTime<Utc>,
    pub dentist_id: Uuid,
}
