//! Admin user listings.
//!
//! ```text
//! GET /api/v1/users
//! GET /api/v1/users/{id}
//! ```

use actix_web::{HttpResponse, get, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, Role, UserBookingEntry, UserId, UserWithBookings};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::UserResponse;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::identity::Authenticated;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Dentist reference inside a user's booking.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DentistRefResponse {
    pub id: Uuid,
    pub name: String,
}

/// One booking as listed under its owner.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBookingResponse {
    pub id: Uuid,
    pub booking_date: DateTime<Utc>,
    pub dentist: DentistRefResponse,
}

impl From<&UserBookingEntry> for UserBookingResponse {
    fn from(entry: &UserBookingEntry) -> Self {
        Self {
            id: *entry.id.as_uuid(),
            booking_date: entry.booking_date,
            dentist: DentistRefResponse {
                id: *entry.dentist_id.as_uuid(),
                name: entry.dentist_name.clone(),
            },
        }
    }
}

/// Account with its bookings joined in.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserWithBookingsResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub bookings: Vec<UserBookingResponse>,
}

impl From<&UserWithBookings> for UserWithBookingsResponse {
    fn from(value: &UserWithBookings) -> Self {
        Self {
            user: UserResponse::from(&value.user),
            bookings: value.bookings.iter().map(UserBookingResponse::from).collect(),
        }
    }
}

/// Every account with its bookings. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users with `count`", body = [UserWithBookingsResponse]),
        (status = 401, description = "Not authorized", body = ErrorSchema),
        (status = 403, description = "Caller is not an admin", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<HttpResponse> {
    caller.require(&[Role::Admin])?;
    let users = state.users.list_users().await?;
    Ok(HttpResponse::Ok().json(Envelope::list(
        users.iter().map(UserWithBookingsResponse::from).collect(),
    )))
}

/// One account with its bookings. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserWithBookingsResponse),
        (status = 401, description = "Not authorized", body = ErrorSchema),
        (status = 403, description = "Caller is not an admin", body = ErrorSchema),
        (status = 404, description = "No such user", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<UserWithBookingsResponse>>> {
    caller.require(&[Role::Admin])?;
    let id = UserId::new(path.as_str())
        .map_err(|_| Error::not_found(format!("No user with the id of {}", path.as_str())))?;
    let user = state.users.get_user(&id).await?;
    Ok(web::Json(Envelope::data(UserWithBookingsResponse::from(
        &user,
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingId, DentistId, Identity};
    use crate::inbound::http::test_utils::{MockPorts, bearer, credentials_resolving, sample_user};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    macro_rules! users_app {
        ($state:expr) => {
            actix_test::init_service(
                App::new().app_data($state).service(
                    web::scope("/api/v1")
                        .service(list_users)
                        .service(get_user),
                ),
            )
            .await
        };
    }

    fn ports_as(role: Role) -> MockPorts {
        MockPorts {
            credentials: credentials_resolving(Identity::new(UserId::random(), role)),
            ..MockPorts::default()
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn non_admins_are_forbidden() {
        let mut ports = ports_as(Role::User);
        ports.users.expect_list_users().never();
        let app = users_app!(ports.into_state());

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/users")
            .insert_header(bearer())
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[actix_web::test]
    async fn admins_see_bookings_with_dentist_names() {
        let mut ports = ports_as(Role::Admin);
        ports.users.expect_list_users().returning(|| {
            Ok(vec![UserWithBookings {
                user: sample_user(Role::User),
                bookings: vec![UserBookingEntry {
                    id: BookingId::random(),
                    booking_date: Utc::now(),
                    dentist_id: DentistId::random(),
                    dentist_name: "Dr. Anan".into(),
                }],
            }])
        });
        let app = users_app!(ports.into_state());

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/users")
            .insert_header(bearer())
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["count"], json!(1));
        assert_eq!(body["data"][0]["email"], json!("ada@example.com"));
        assert_eq!(
            body["data"][0]["bookings"][0]["dentist"]["name"],
            json!("Dr. Anan")
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_user_id_is_not_found() {
        let mut ports = ports_as(Role::Admin);
        ports.users.expect_get_user().never();
        let app = users_app!(ports.into_state());

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/users/42")
            .insert_header(bearer())
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
