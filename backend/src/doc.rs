//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every handler under `/api/v1`, the health probes, the
//! request and response DTOs, and the error envelope. Two security schemes
//! are registered because the session token is accepted either as a bearer
//! header or as the `token` cookie.
//!
//! The document backs Swagger UI in debug builds and is printed by the
//! `openapi-dump` binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::auth::{
    ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateMeRequest, UserResponse,
};
use crate::inbound::http::bookings::{
    BookedDentistResponse, BookingResponse, CreateBookingRequest, UpdateBookingRequest,
};
use crate::inbound::http::dentists::{DentistDetailsResponse, DentistRequest, DentistResponse};
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, PageCursorSchema, PaginationSchema,
};
use crate::inbound::http::users::{
    DentistRefResponse, UserBookingResponse, UserWithBookingsResponse,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "TokenCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "token",
                "Session cookie set by register, login, and change-password.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Dental clinic booking API",
        description = "Accounts, a public dentist directory, and a one-booking-per-user ledger."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = []), ("TokenCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::get_me,
        crate::inbound::http::auth::update_me,
        crate::inbound::http::auth::change_password,
        crate::inbound::http::dentists::list_dentists,
        crate::inbound::http::dentists::get_dentist,
        crate::inbound::http::dentists::create_dentist,
        crate::inbound::http::dentists::update_dentist,
        crate::inbound::http::dentists::delete_dentist,
        crate::inbound::http::bookings::list_bookings,
        crate::inbound::http::bookings::list_dentist_bookings,
        crate::inbound::http::bookings::get_booking,
        crate::inbound::http::bookings::add_booking,
        crate::inbound::http::bookings::update_booking,
        crate::inbound::http::bookings::delete_booking,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        PaginationSchema,
        PageCursorSchema,
        RegisterRequest,
        LoginRequest,
        UpdateMeRequest,
        ChangePasswordRequest,
        UserResponse,
        DentistRequest,
        DentistResponse,
        DentistDetailsResponse,
        CreateBookingRequest,
        UpdateBookingRequest,
        BookingResponse,
        BookedDentistResponse,
        UserWithBookingsResponse,
        UserBookingResponse,
        DentistRefResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login, and the caller's own account"),
        (name = "dentists", description = "Public dentist directory with admin maintenance"),
        (name = "bookings", description = "Booking ledger; one booking per non-admin user"),
        (name = "users", description = "Admin view of accounts and their bookings"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
