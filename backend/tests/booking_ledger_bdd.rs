//! Behaviour tests for the booking ledger over the full HTTP stack.
//!
//! Scenarios cover the one-booking cap, admin exemption, ownership checks,
//! immutability of the booking owner, and the dentist cascade.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

// Shared harness has helpers unused in this specific suite.
#[allow(dead_code)]
#[path = "support/world.rs"]
mod harness;
#[path = "support/common_steps.rs"]
mod common_steps;

use actix_web::http::Method;
use rstest::fixture;
use rstest_bdd_macros::{scenario, then, when};
use serde_json::json;

use harness::{Reply, SharedWorld, WorldFixture, booking_of, dentist_id, send, token_of};

#[fixture]
fn world() -> WorldFixture {
    harness::world()
}

#[when("{account} deletes the booking held by {owner}")]
fn account_deletes_booking(world: &WorldFixture, account: String, owner: String) {
    let world = world.world();
    let path = format!("/api/v1/bookings/{}", booking_of(&world, &owner));
    let token = token_of(&world, &account);
    send(&world, Method::DELETE, &path, Some(token), None);
}

#[when("{account} moves the booking to {date} naming {other} as owner")]
fn account_moves_booking(world: &WorldFixture, account: String, date: String, other: String) {
    let world = world.world();
    let path = format!("/api/v1/bookings/{}", booking_of(&world, &account));
    let token = token_of(&world, &account);
    let other_id = world.borrow().user_ids.get(&other).cloned().expect("other id");
    send(
        &world,
        Method::PUT,
        &path,
        Some(token),
        Some(json!({"bookingDate": date, "user": other_id})),
    );
}

#[when("{account} reschedules the booking held by {owner} to {date}")]
fn account_reschedules_booking(world: &WorldFixture, account: String, owner: String, date: String) {
    let world = world.world();
    let path = format!("/api/v1/bookings/{}", booking_of(&world, &owner));
    let token = token_of(&world, &account);
    send(
        &world,
        Method::PUT,
        &path,
        Some(token),
        Some(json!({"bookingDate": date})),
    );
}

#[when("admin deletes dentist {name}")]
fn admin_deletes_dentist(world: &WorldFixture, name: String) {
    let world = world.world();
    let path = format!("/api/v1/dentists/{}", dentist_id(&world, &name));
    let token = token_of(&world, harness::ADMIN);
    send(&world, Method::DELETE, &path, Some(token), None);
}

#[then("the booking held by {owner} belongs to {expected}")]
fn the_booking_belongs_to(world: &WorldFixture, owner: String, expected: String) {
    let world = world.world();
    let path = format!("/api/v1/bookings/{}", booking_of(&world, &owner));
    let token = token_of(&world, harness::ADMIN);
    let reply = send(&world, Method::GET, &path, Some(token), None);
    let expected_id = world
        .borrow()
        .user_ids
        .get(&expected)
        .cloned()
        .expect("expected owner id");
    assert_eq!(reply.status, 200, "body: {}", reply.body);
    assert_eq!(reply.body["data"]["user"].as_str(), Some(expected_id.as_str()));
}

fn admin_view_of_booking(world: &SharedWorld, owner: &str) -> Reply {
    let path = format!("/api/v1/bookings/{}", booking_of(world, owner));
    let token = token_of(world, harness::ADMIN);
    send(world, Method::GET, &path, Some(token), None)
}

#[then("the booking held by {owner} is dated {date}")]
fn the_booking_is_dated(world: &WorldFixture, owner: String, date: String) {
    let reply = admin_view_of_booking(&world.world(), &owner);
    assert_eq!(reply.status, 200, "body: {}", reply.body);
    let stored = reply.body["data"]["bookingDate"]
        .as_str()
        .expect("booking date")
        .to_owned();
    assert!(stored.starts_with(&date), "{stored} is not on {date}");
}

#[then("the booking held by {owner} is gone")]
fn the_booking_is_gone(world: &WorldFixture, owner: String) {
    let reply = admin_view_of_booking(&world.world(), &owner);
    assert_eq!(reply.status, 404, "body: {}", reply.body);
}

#[scenario(path = "tests/features/booking_ledger.feature")]
fn booking_ledger_scenarios(world: WorldFixture) {
    drop(world);
}
