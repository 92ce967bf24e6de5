//! Route table for the `/api/v1` scope.

use actix_web::web;

use super::error::{json_error_handler, path_error_handler, query_error_handler};
use super::{auth, bookings, dentists, users};

/// Prefix shared by every API route.
pub const API_PREFIX: &str = "/api/v1";

/// Register every API handler and the extractor configs that route framework
/// failures through the error envelope.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use clinic_backend::inbound::http::routes::configure_api;
///
/// let app = App::new().configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(API_PREFIX)
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::get_me)
            .service(auth::update_me)
            .service(auth::change_password)
            .service(dentists::list_dentists)
            .service(dentists::create_dentist)
            .service(bookings::list_dentist_bookings)
            .service(bookings::add_booking)
            .service(dentists::get_dentist)
            .service(dentists::update_dentist)
            .service(dentists::delete_dentist)
            .service(bookings::list_bookings)
            .service(bookings::get_booking)
            .service(bookings::update_booking)
            .service(bookings::delete_booking)
            .service(users::list_users)
            .service(users::get_user),
    );
}
