//! Steps shared by every clinic behaviour suite.

use actix_web::http::Method;
use rstest_bdd_macros::{given, then, when};
use serde_json::Value;

use crate::harness::{
    WorldFixture, book, create_dentist, last_reply, register_patient, send, token_of,
};

#[given("dentist {name} with {years} years of experience")]
fn dentist_with_experience(world: &WorldFixture, name: String, years: String) {
    let years: i64 = years.parse().expect("whole years");
    create_dentist(&world.world(), &name, years);
}

#[given("a registered patient named {account}")]
fn a_registered_patient(world: &WorldFixture, account: String) {
    let reply = register_patient(&world.world(), &account);
    assert_eq!(reply.status, 200, "register {account}: {}", reply.body);
}

#[given("{account} has booked {dentist} on {date}")]
fn account_has_booked(world: &WorldFixture, account: String, dentist: String, date: String) {
    let reply = book(&world.world(), &account, &dentist, &date);
    assert_eq!(reply.status, 201, "booking for {account}: {}", reply.body);
}

#[when("{account} books {dentist} on {date}")]
fn account_books(world: &WorldFixture, account: String, dentist: String, date: String) {
    book(&world.world(), &account, &dentist, &date);
}

#[when("{account} lists bookings")]
fn account_lists_bookings(world: &WorldFixture, account: String) {
    let world = world.world();
    let token = token_of(&world, &account);
    send(&world, Method::GET, "/api/v1/bookings", Some(token), None);
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &WorldFixture, status: String) {
    let expected: u16 = status.parse().expect("numeric status");
    let reply = last_reply(&world.world());
    assert_eq!(reply.status, expected, "body: {}", reply.body);
}

#[then("the error code is {code}")]
fn the_error_code_is(world: &WorldFixture, code: String) {
    let reply = last_reply(&world.world());
    assert_eq!(reply.body["success"], Value::Bool(false));
    assert_eq!(reply.body["code"].as_str(), Some(code.as_str()));
}

#[then("the listing holds {count} entries")]
fn the_listing_holds(world: &WorldFixture, count: String) {
    let expected: u64 = count.parse().expect("numeric count");
    let reply = last_reply(&world.world());
    assert_eq!(reply.status, 200, "body: {}", reply.body);
    assert_eq!(reply.body["count"].as_u64(), Some(expected));
    let listed = reply.body["data"].as_array().map(Vec::len);
    assert_eq!(listed, usize::try_from(expected).ok());
}
