//! Behaviour tests for session token configuration.
//!
//! These scenarios validate that release builds enforce an explicit signing
//! secret and reject malformed lifetimes, while debug builds fall back.

use std::cell::RefCell;
use std::collections::HashMap;

use clinic_backend::inbound::http::session_config::{
    BuildMode, TokenConfigError, TokenSettings, token_settings_from_env,
};
use mockable::MockEnv;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

struct TokenConfigWorld {
    vars: RefCell<HashMap<String, String>>,
    mode: RefCell<BuildMode>,
    outcome: RefCell<Option<Result<TokenSettings, TokenConfigError>>>,
}

impl TokenConfigWorld {
    fn new() -> Self {
        Self {
            vars: RefCell::new(HashMap::new()),
            mode: RefCell::new(BuildMode::Release),
            outcome: RefCell::new(None),
        }
    }

    fn set_env_var(&self, name: &str, value: &str) {
        self.vars
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
    }

    fn evaluate(&self, production: bool) {
        let env = mock_env(self.vars.borrow().clone());
        let mode = *self.mode.borrow();
        *self.outcome.borrow_mut() = Some(token_settings_from_env(&env, mode, production));
    }

    fn with_settings<F>(&self, f: F)
    where
        F: FnOnce(&TokenSettings),
    {
        let outcome = self.outcome.borrow();
        let settings = outcome
            .as_ref()
            .expect("evaluation result")
            .as_ref()
            .expect("expected settings to succeed");
        f(settings);
    }

    fn with_error<F>(&self, f: F)
    where
        F: FnOnce(&TokenConfigError),
    {
        let outcome = self.outcome.borrow();
        let error = match outcome.as_ref().expect("evaluation result") {
            Ok(_) => panic!("expected settings to fail"),
            Err(error) => error,
        };
        f(error);
    }
}

fn mock_env(vars: HashMap<String, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

#[fixture]
fn world() -> TokenConfigWorld {
    TokenConfigWorld::new()
}

#[given("a release build configuration")]
fn a_release_build_configuration(world: &TokenConfigWorld) {
    *world.mode.borrow_mut() = BuildMode::Release;
}

#[given("a debug build configuration")]
fn a_debug_build_configuration(world: &TokenConfigWorld) {
    *world.mode.borrow_mut() = BuildMode::Debug;
}

#[given("JWT_SECRET is set to {value}")]
fn jwt_secret_is_set(world: &TokenConfigWorld, value: String) {
    world.set_env_var("JWT_SECRET", &value);
}

#[given("JWT_EXPIRE_DAYS is set to {value}")]
fn jwt_expire_days_is_set(world: &TokenConfigWorld, value: String) {
    world.set_env_var("JWT_EXPIRE_DAYS", &value);
}

#[given("JWT_COOKIE_EXPIRE_DAYS is set to {value}")]
fn jwt_cookie_expire_days_is_set(world: &TokenConfigWorld, value: String) {
    world.set_env_var("JWT_COOKIE_EXPIRE_DAYS", &value);
}

#[when("the token configuration is loaded")]
fn the_token_configuration_is_loaded(world: &TokenConfigWorld) {
    world.evaluate(false);
}

#[when("the token configuration is loaded in production")]
fn the_token_configuration_is_loaded_in_production(world: &TokenConfigWorld) {
    world.evaluate(true);
}

#[then("the configuration load succeeds")]
fn the_configuration_load_succeeds(world: &TokenConfigWorld) {
    world.with_settings(|_| {});
}

#[then("tokens live for {days} days")]
fn tokens_live_for(world: &TokenConfigWorld, days: u32) {
    world.with_settings(|settings| {
        assert_eq!(settings.token_lifetime_days, days);
    });
}

#[then("the cookie secure flag is true")]
fn the_cookie_secure_flag_is_true(world: &TokenConfigWorld) {
    world.with_settings(|settings| assert!(settings.cookie_secure));
}

#[then("the cookie secure flag is false")]
fn the_cookie_secure_flag_is_false(world: &TokenConfigWorld) {
    world.with_settings(|settings| assert!(!settings.cookie_secure));
}

#[then("the configuration load fails due to missing JWT_SECRET")]
fn configuration_fails_missing_secret(world: &TokenConfigWorld) {
    world.with_error(|error| {
        assert_eq!(error, &TokenConfigError::MissingEnv { name: "JWT_SECRET" });
    });
}

#[then("the configuration load fails because the secret is too short")]
fn configuration_fails_short_secret(world: &TokenConfigWorld) {
    world.with_error(|error| {
        assert!(matches!(error, TokenConfigError::SecretTooShort { .. }));
    });
}

#[then("the configuration load fails because JWT_COOKIE_EXPIRE_DAYS is invalid")]
fn configuration_fails_invalid_cookie_days(world: &TokenConfigWorld) {
    world.with_error(|error| {
        assert!(matches!(
            error,
            TokenConfigError::InvalidEnv {
                name: "JWT_COOKIE_EXPIRE_DAYS",
                ..
            }
        ));
    });
}

#[scenario(path = "tests/features/token_config.feature")]
fn token_configuration_scenarios(world: TokenConfigWorld) {
    drop(world);
}
