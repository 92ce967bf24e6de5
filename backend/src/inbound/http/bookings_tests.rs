//! Handler tests for the booking endpoints.

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::{Booking, DentistId, Identity, Role, UserId};
use crate::inbound::http::test_utils::{MockPorts, bearer, credentials_resolving};

macro_rules! booking_app {
    ($state:expr) => {
        actix_test::init_service(
            App::new().app_data($state).service(
                web::scope("/api/v1")
                    .service(list_bookings)
                    .service(list_dentist_bookings)
                    .service(get_booking)
                    .service(add_booking)
                    .service(update_booking)
                    .service(delete_booking),
            ),
        )
        .await
    };
}

fn view(owner: UserId) -> BookingView {
    let now = Utc::now();
    BookingView {
        booking: Booking {
            id: BookingId::random(),
            booking_date: now,
            user: owner,
            dentist: DentistId::random(),
            cap_exempt: false,
            created_at: now,
        },
        dentist: DentistSummary {
            id: DentistId::random(),
            name: "Dr. Anan".into(),
            experience_years: 8,
            expertise: "Orthodontics".into(),
        },
    }
}

fn caller_ports(identity: Identity) -> MockPorts {
    MockPorts {
        credentials: credentials_resolving(identity),
        ..MockPorts::default()
    }
}

#[rstest]
#[actix_web::test]
async fn list_reports_count_and_embeds_dentist() {
    let identity = Identity::new(UserId::random(), Role::User);
    let mut ports = caller_ports(identity);
    ports
        .bookings
        .expect_list_bookings()
        .withf(|_, dentist| dentist.is_none())
        .returning(move |caller, _| Ok(vec![view(caller.user_id)]));
    let app = booking_app!(ports.into_state());

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/bookings")
        .insert_header(bearer())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["data"][0]["dentist"]["name"], json!("Dr. Anan"));
    assert_eq!(
        body["data"][0]["user"],
        json!(identity.user_id.to_string())
    );
}

#[rstest]
#[actix_web::test]
async fn add_parses_calendar_dates_and_returns_created() {
    let identity = Identity::new(UserId::random(), Role::User);
    let dentist = DentistId::random();
    let expected = Utc
        .with_ymd_and_hms(2025, 3, 14, 0, 0, 0)
        .single()
        .expect("valid date");
    let mut ports = caller_ports(identity);
    ports
        .bookings
        .expect_add_booking()
        .withf(move |_, target, date| *target == dentist && *date == expected)
        .times(1)
        .returning(|caller, _, _| Ok(view(caller.user_id)));
    let app = booking_app!(ports.into_state());

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/dentists/{dentist}/bookings"))
        .insert_header(bearer())
        .set_json(json!({"bookingDate": "2025-03-14", "user": UserId::random().to_string()}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[rstest]
#[case::missing(json!({}), "missing_field")]
#[case::garbled(json!({"bookingDate": "soon"}), "invalid_value")]
#[actix_web::test]
async fn add_rejects_bad_dates(#[case] payload: Value, #[case] code: &str) {
    let mut ports = caller_ports(Identity::new(UserId::random(), Role::User));
    ports.bookings.expect_add_booking().never();
    let app = booking_app!(ports.into_state());

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/dentists/{}/bookings", DentistId::random()))
        .insert_header(bearer())
        .set_json(payload)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], json!("bookingDate"));
    assert_eq!(body["details"]["code"], json!(code));
}

#[rstest]
#[actix_web::test]
async fn duplicate_booking_is_bad_request() {
    let mut ports = caller_ports(Identity::new(UserId::random(), Role::User));
    ports
        .bookings
        .expect_add_booking()
        .returning(|caller, _, _| {
            Err(Error::duplicate_booking(format!(
                "The user with ID {} has already made a booking. Only 1 booking is allowed.",
                caller.user_id
            )))
        });
    let app = booking_app!(ports.into_state());

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/dentists/{}/bookings", DentistId::random()))
        .insert_header(bearer())
        .set_json(json!({"bookingDate": "2025-03-14"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], json!("duplicate_booking"));
}

#[rstest]
#[actix_web::test]
async fn update_ignores_user_field() {
    let identity = Identity::new(UserId::random(), Role::User);
    let mut ports = caller_ports(identity);
    ports
        .bookings
        .expect_update_booking()
        .withf(|_, _, patch| patch.dentist.is_none() && patch.booking_date.is_some())
        .returning(|caller, _, _| Ok(view(caller.user_id)));
    let app = booking_app!(ports.into_state());

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/bookings/{}", BookingId::random()))
        .insert_header(bearer())
        .set_json(json!({
            "bookingDate": "2025-04-01T10:00:00Z",
            "user": UserId::random().to_string()
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["data"]["user"], json!(identity.user_id.to_string()));
}

#[rstest]
#[actix_web::test]
async fn stranger_gets_forbidden() {
    let mut ports = caller_ports(Identity::new(UserId::random(), Role::User));
    ports
        .bookings
        .expect_delete_booking()
        .returning(|caller, _| {
            Err(Error::forbidden(format!(
                "User {} is not authorized to delete this booking",
                caller.user_id
            )))
        });
    let app = booking_app!(ports.into_state());

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/bookings/{}", BookingId::random()))
        .insert_header(bearer())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn booking_routes_require_a_session() {
    let mut ports = MockPorts::default();
    ports.bookings.expect_list_bookings().never();
    let app = booking_app!(ports.into_state());

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/bookings")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
