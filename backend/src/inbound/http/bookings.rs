//! Booking ledger handlers.
//!
//! ```text
//! GET    /api/v1/bookings
//! GET    /api/v1/bookings/{id}
//! PUT    /api/v1/bookings/{id} {"bookingDate":"2025-03-14"}
//! DELETE /api/v1/bookings/{id}
//! GET    /api/v1/dentists/{dentistId}/bookings
//! POST   /api/v1/dentists/{dentistId}/bookings {"bookingDate":"2025-03-14T09:30:00Z"}
//! ```
//!
//! Every route requires a session. Ownership checks live in the ledger.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{BookingId, BookingPatch, BookingView, DentistSummary, Error, parse_booking_date};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dentists::parse_dentist_id;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::identity::Authenticated;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, map_booking_error, require};

/// Dentist fields embedded in a booking.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookedDentistResponse {
    pub id: Uuid,
    pub name: String,
    pub experience_years: i32,
    pub expertise: String,
}

impl From<&DentistSummary> for BookedDentistResponse {
    fn from(summary: &DentistSummary) -> Self {
        Self {
            id: *summary.id.as_uuid(),
            name: summary.name.clone(),
            experience_years: summary.experience_years,
            expertise: summary.expertise.clone(),
        }
    }
}

/// Booking as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub booking_date: DateTime<Utc>,
    /// Owning account.
    pub user: Uuid,
    pub dentist: BookedDentistResponse,
    pub created_at: DateTime<Utc>,
}

impl From<&BookingView> for BookingResponse {
    fn from(view: &BookingView) -> Self {
        Self {
            id: *view.booking.id.as_uuid(),
            booking_date: view.booking.booking_date,
            user: *view.booking.user.as_uuid(),
            dentist: BookedDentistResponse::from(&view.dentist),
            created_at: view.booking.created_at,
        }
    }
}

/// Request body for `POST /api/v1/dentists/{dentistId}/bookings`.
///
/// The owner is always the caller and the dentist always comes from the path.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    #[schema(example = "2025-03-14T09:30:00Z")]
    pub booking_date: Option<String>,
}

/// Request body for `PUT /api/v1/bookings/{id}`.
///
/// A `user` field, if sent, is ignored: bookings never change owner.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    pub booking_date: Option<String>,
    /// Identifier of the dentist to move the booking to.
    pub dentist: Option<String>,
}

impl UpdateBookingRequest {
    fn into_patch(self) -> Result<BookingPatch, Error> {
        Ok(BookingPatch {
            booking_date: self
                .booking_date
                .as_deref()
                .map(parse_booking_date)
                .transpose()
                .map_err(map_booking_error)?,
            dentist: self
                .dentist
                .as_deref()
                .map(parse_dentist_id)
                .transpose()?,
        })
    }
}

fn parse_booking_id(raw: &str) -> Result<BookingId, Error> {
    BookingId::new(raw).map_err(|_| Error::not_found(format!("No booking with the id of {raw}")))
}

fn list_response(views: &[BookingView]) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::list(
        views.iter().map(BookingResponse::from).collect(),
    ))
}

/// Bookings visible to the caller: their own, or every booking for admins.
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    responses(
        (status = 200, description = "Bookings with `count`", body = [BookingResponse]),
        (status = 401, description = "Not authorized", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "listBookings"
)]
#[get("/bookings")]
pub async fn list_bookings(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let views = state.bookings.list_bookings(caller.identity(), None).await?;
    Ok(list_response(&views))
}

/// Bookings for one dentist. Non-admins still only see their own.
#[utoipa::path(
    get,
    path = "/api/v1/dentists/{dentistId}/bookings",
    params(("dentistId" = String, Path, description = "Dentist identifier")),
    responses(
        (status = 200, description = "Bookings with `count`", body = [BookingResponse]),
        (status = 401, description = "Not authorized", body = ErrorSchema),
        (status = 404, description = "No such dentist", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "listDentistBookings"
)]
#[get("/dentists/{dentist_id}/bookings")]
pub async fn list_dentist_bookings(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let dentist = parse_dentist_id(&path)?;
    let views = state
        .bookings
        .list_bookings(caller.identity(), Some(dentist))
        .await?;
    Ok(list_response(&views))
}

/// Fetch one booking. Owner or admin only.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    params(("id" = String, Path, description = "Booking identifier")),
    responses(
        (status = 200, description = "Booking", body = BookingResponse),
        (status = 401, description = "Not authorized", body = ErrorSchema),
        (status = 403, description = "Caller neither owns the booking nor is an admin", body = ErrorSchema),
        (status = 404, description = "No such booking", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "getBooking"
)]
#[get("/bookings/{id}")]
pub async fn get_booking(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<BookingResponse>>> {
    let id = parse_booking_id(&path)?;
    let view = state.bookings.get_booking(caller.identity(), &id).await?;
    Ok(web::Json(Envelope::data(BookingResponse::from(&view))))
}

/// Book a dentist for the caller. Non-admins may hold one booking.
#[utoipa::path(
    post,
    path = "/api/v1/dentists/{dentistId}/bookings",
    params(("dentistId" = String, Path, description = "Dentist identifier")),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Created", body = BookingResponse),
        (status = 400, description = "Invalid date or booking cap reached", body = ErrorSchema),
        (status = 401, description = "Not authorized", body = ErrorSchema),
        (status = 404, description = "No such dentist", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "addBooking"
)]
#[post("/dentists/{dentist_id}/bookings")]
pub async fn add_booking(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<CreateBookingRequest>,
) -> ApiResult<HttpResponse> {
    let dentist = parse_dentist_id(&path)?;
    let raw_date = require(
        payload.into_inner().booking_date,
        FieldName::new("bookingDate"),
    )?;
    let booking_date = parse_booking_date(&raw_date).map_err(map_booking_error)?;
    let view = state
        .bookings
        .add_booking(caller.identity(), &dentist, booking_date)
        .await?;
    Ok(HttpResponse::Created().json(Envelope::data(BookingResponse::from(&view))))
}

/// Change the date or dentist of a booking. Owner or admin only.
#[utoipa::path(
    put,
    path = "/api/v1/bookings/{id}",
    params(("id" = String, Path, description = "Booking identifier")),
    request_body = UpdateBookingRequest,
    responses(
        (status = 200, description = "Updated", body = BookingResponse),
        (status = 400, description = "Invalid date", body = ErrorSchema),
        (status = 401, description = "Not authorized", body = ErrorSchema),
        (status = 403, description = "Caller neither owns the booking nor is an admin", body = ErrorSchema),
        (status = 404, description = "No such booking or dentist", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "updateBooking"
)]
#[put("/bookings/{id}")]
pub async fn update_booking(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<UpdateBookingRequest>,
) -> ApiResult<web::Json<Envelope<BookingResponse>>> {
    let id = parse_booking_id(&path)?;
    let patch = payload.into_inner().into_patch()?;
    let view = state
        .bookings
        .update_booking(caller.identity(), &id, patch)
        .await?;
    Ok(web::Json(Envelope::data(BookingResponse::from(&view))))
}

/// Remove a booking. Owner or admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/bookings/{id}",
    params(("id" = String, Path, description = "Booking identifier")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 401, description = "Not authorized", body = ErrorSchema),
        (status = 403, description = "Caller neither owns the booking nor is an admin", body = ErrorSchema),
        (status = 404, description = "No such booking", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "deleteBooking"
)]
#[delete("/bookings/{id}")]
pub async fn delete_booking(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_booking_id(&path)?;
    state.bookings.delete_booking(caller.identity(), &id).await?;
    Ok(Envelope::deleted())
}

#[cfg(test)]
#[path = "bookings_tests.rs"]
mod tests;
