//! Behaviour tests for registration, login, and session enforcement.
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
use serde_json::{Value, json};

use harness::{PASSWORD, WorldFixture, last_reply, register_patient, send, token_of};

#[fixture]
fn world() -> WorldFixture {
    harness::world()
}

fn set_cookie(world: &WorldFixture) -> String {
    last_reply(&world.world())
        .set_cookie
        .expect("set-cookie header")
}

#[when("a patient registers as {account}")]
fn a_patient_registers(world: &WorldFixture, account: String) {
    register_patient(&world.world(), &account);
}

#[when("{account} logs in with password {password}")]
fn account_logs_in(world: &WorldFixture, account: String, password: String) {
    send(
        &world.world(),
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"email": format!("{account}@example.com"), "password": password})),
    );
}

#[when("{account} changes their password to {password}")]
fn account_changes_password(world: &WorldFixture, account: String, password: String) {
    let world = world.world();
    let token = token_of(&world, &account);
    let reply = send(
        &world,
        Method::PUT,
        "/api/v1/auth/change-password",
        Some(token),
        Some(json!({"currentPassword": PASSWORD, "newPassword": password})),
    );
    if let Some(token) = reply.body.get("token").and_then(Value::as_str) {
        world.borrow_mut().tokens.insert(account, token.to_owned());
    }
}

#[when("{account} logs out")]
fn account_logs_out(world: &WorldFixture, account: String) {
    let world = world.world();
    let token = token_of(&world, &account);
    send(&world, Method::GET, "/api/v1/auth/logout", Some(token), None);
}

#[when("{account} lists users")]
fn account_lists_users(world: &WorldFixture, account: String) {
    let world = world.world();
    let token = token_of(&world, &account);
    send(&world, Method::GET, "/api/v1/users", Some(token), None);
}

#[when("an anonymous client requests the booking list")]
fn anonymous_booking_list(world: &WorldFixture) {
    send(&world.world(), Method::GET, "/api/v1/bookings", None, None);
}

#[then("the response sets an http-only token cookie")]
fn the_response_sets_a_token_cookie(world: &WorldFixture) {
    let cookie = set_cookie(world);
    let token = last_reply(&world.world()).body["token"]
        .as_str()
        .expect("token in body")
        .to_owned();
    assert!(cookie.starts_with(&format!("token={token}")), "{cookie}");
    assert!(cookie.contains("HttpOnly"), "{cookie}");
    assert!(!cookie.contains("Secure"), "{cookie}");
}

#[then("the response expires the token cookie")]
fn the_response_expires_the_token_cookie(world: &WorldFixture) {
    let cookie = set_cookie(world);
    assert!(cookie.starts_with("token=none"), "{cookie}");
    assert!(cookie.contains("Max-Age=0"), "{cookie}");
}

#[then("{account} reads their own profile with role {role}")]
fn account_reads_profile(world: &WorldFixture, account: String, role: String) {
    let world = world.world();
    let token = token_of(&world, &account);
    let reply = send(&world, Method::GET, "/api/v1/auth/me", Some(token), None);
    assert_eq!(reply.status, 200, "body: {}", reply.body);
    let data = &reply.body["data"];
    assert_eq!(data["email"], json!(format!("{account}@example.com")));
    assert_eq!(data["role"], json!(role));
    assert!(data.get("password").is_none());
}

#[scenario(path = "tests/features/account_session.feature")]
fn account_session_scenarios(world: WorldFixture) {
    drop(world);
}
