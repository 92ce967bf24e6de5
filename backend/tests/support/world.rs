//! Server harness and shared world for the clinic behaviour suites.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. Each world starts the full application
//! over a fresh in-memory store seeded with one admin account, and stops the
//! server when dropped.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::TcpListener;
use std::rc::Rc;

use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{HttpServer, web};
use awc::Client;
use chrono::Utc;
use clinic_backend::domain::ports::{PasswordHasher, UserRepository};
use clinic_backend::domain::{Email, Role, TelephoneNumber, User, UserId, UserName};
use clinic_backend::inbound::http::health::HealthState;
use clinic_backend::inbound::http::session_config::TokenSettings;
use clinic_backend::outbound::memory::InMemoryStore;
use clinic_backend::outbound::security::Argon2PasswordHasher;
use clinic_backend::server::{Storage, build_app, build_http_state};
use rstest::fixture;
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;
use zeroize::Zeroizing;

pub(crate) const ADMIN: &str = "admin";
pub(crate) const PASSWORD: &str = "secret1";

/// Response captured from the most recent request.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub(crate) status: u16,
    pub(crate) set_cookie: Option<String>,
    pub(crate) body: Value,
}

pub(crate) struct ClinicWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    pub(crate) tokens: HashMap<String, String>,
    pub(crate) user_ids: HashMap<String, String>,
    pub(crate) dentists: HashMap<String, String>,
    pub(crate) bookings: HashMap<String, String>,
    pub(crate) next_phone: u32,
    pub(crate) last: Option<Reply>,
}

pub(crate) type SharedWorld = Rc<RefCell<ClinicWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        let ctx = self.world.borrow();
        let server = ctx.server.clone();
        ctx.local.block_on(&ctx.runtime, async move {
            server.stop(true).await;
        });
    }
}

fn test_tokens() -> TokenSettings {
    TokenSettings {
        secret: Zeroizing::new(b"clinic-behaviour-suite-signing-key".to_vec()),
        token_lifetime_days: 1,
        cookie_lifetime_days: 1,
        cookie_secure: false,
    }
}

async fn seed_admin(store: &InMemoryStore) -> UserId {
    let admin = User {
        id: UserId::random(),
        name: UserName::new("Clinic Admin").expect("admin name"),
        telephone_number: TelephoneNumber::new("0800000000").expect("admin phone"),
        email: Email::new("admin@clinic.test").expect("admin email"),
        role: Role::Admin,
        created_at: Utc::now(),
    };
    let hash = Argon2PasswordHasher.hash(PASSWORD).expect("hash admin password");
    store.insert(&admin, &hash).await.expect("seed admin");
    admin.id
}

async fn spawn_clinic_server(store: InMemoryStore) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;

    let http_state = build_http_state(&Storage::Memory(store), &test_tokens());
    let health_state = web::Data::new(HealthState::new());
    health_state.mark_ready();

    let server = HttpServer::new(move || build_app(health_state.clone(), http_state.clone()))
        .disable_signals()
        .workers(1)
        .listen(listener)
        .map_err(|err| err.to_string())?
        .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

#[fixture]
pub(crate) fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    let store = InMemoryStore::new();

    let (admin_id, (base_url, server)) = local.block_on(&runtime, async {
        let admin_id = seed_admin(&store).await;
        let spawned = spawn_clinic_server(store.clone())
            .await
            .expect("spawn clinic server");
        (admin_id, spawned)
    });

    let world = Rc::new(RefCell::new(ClinicWorld {
        runtime,
        local,
        base_url,
        server,
        tokens: HashMap::new(),
        user_ids: HashMap::from([(ADMIN.to_owned(), admin_id.to_string())]),
        dentists: HashMap::new(),
        bookings: HashMap::new(),
        next_phone: 1,
        last: None,
    }));

    let reply = send(
        &world,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"email": "admin@clinic.test", "password": PASSWORD})),
    );
    let token = token_from(&reply);
    world.borrow_mut().tokens.insert(ADMIN.to_owned(), token);

    WorldFixture { world }
}

/// Issue a request and record the reply as the world's last response.
pub(crate) fn send(
    world: &SharedWorld,
    method: Method,
    path: &str,
    token: Option<String>,
    payload: Option<Value>,
) -> Reply {
    let url = format!("{}{path}", world.borrow().base_url);
    let reply = {
        let ctx = world.borrow();
        ctx.local.block_on(&ctx.runtime, async move {
            let mut request = Client::default().request(method, url);
            if let Some(token) = token {
                request = request.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
            }
            let mut response = match payload {
                Some(payload) => request.send_json(&payload).await.expect("send request"),
                None => request.send().await.expect("send request"),
            };
            let status = response.status().as_u16();
            let set_cookie = response
                .headers()
                .get(header::SET_COOKIE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let bytes = response.body().await.expect("read body");
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).expect("json body")
            };
            Reply {
                status,
                set_cookie,
                body,
            }
        })
    };
    world.borrow_mut().last = Some(reply.clone());
    reply
}

fn token_from(reply: &Reply) -> String {
    reply
        .body
        .get("token")
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("token in {}", reply.body))
        .to_owned()
}

/// Session token held by an account label.
pub(crate) fn token_of(world: &SharedWorld, account: &str) -> String {
    world
        .borrow()
        .tokens
        .get(account)
        .cloned()
        .unwrap_or_else(|| panic!("no session for {account}"))
}

/// Register a patient whose email is `<account>@example.com`.
pub(crate) fn register_patient(world: &SharedWorld, account: &str) -> Reply {
    let phone = {
        let mut ctx = world.borrow_mut();
        ctx.next_phone += 1;
        format!("08{:08}", ctx.next_phone)
    };
    let reply = send(
        world,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "name": account,
            "telephoneNumber": phone,
            "email": format!("{account}@example.com"),
            "password": PASSWORD,
        })),
    );
    if reply.status == 200 {
        let token = token_from(&reply);
        let me = send(world, Method::GET, "/api/v1/auth/me", Some(token.clone()), None);
        let id = me.body["data"]["id"]
            .as_str()
            .expect("profile id")
            .to_owned();
        let mut ctx = world.borrow_mut();
        ctx.tokens.insert(account.to_owned(), token);
        ctx.user_ids.insert(account.to_owned(), id);
        ctx.last = Some(reply.clone());
    }
    reply
}

/// Create a dentist as the seeded admin and remember its id by name.
pub(crate) fn create_dentist(world: &SharedWorld, name: &str, years: i64) {
    let reply = send(
        world,
        Method::POST,
        "/api/v1/dentists",
        Some(token_of(world, ADMIN)),
        Some(json!({
            "name": name,
            "experienceYears": years,
            "expertise": "General dentistry",
        })),
    );
    assert_eq!(reply.status, 201, "create dentist: {}", reply.body);
    let id = reply.body["data"]["id"]
        .as_str()
        .expect("dentist id")
        .to_owned();
    world.borrow_mut().dentists.insert(name.to_owned(), id);
}

/// Identifier of a dentist created earlier in the scenario.
pub(crate) fn dentist_id(world: &SharedWorld, name: &str) -> String {
    world
        .borrow()
        .dentists
        .get(name)
        .cloned()
        .unwrap_or_else(|| panic!("unknown dentist {name}"))
}

/// Book `dentist` for `account` and remember the booking on success.
pub(crate) fn book(world: &SharedWorld, account: &str, dentist: &str, date: &str) -> Reply {
    let path = format!("/api/v1/dentists/{}/bookings", dentist_id(world, dentist));
    let reply = send(
        world,
        Method::POST,
        &path,
        Some(token_of(world, account)),
        Some(json!({"bookingDate": date})),
    );
    if reply.status == 201 {
        let id = reply.body["data"]["id"]
            .as_str()
            .expect("booking id")
            .to_owned();
        world.borrow_mut().bookings.insert(account.to_owned(), id);
    }
    reply
}

/// Booking most recently created by `account`.
pub(crate) fn booking_of(world: &SharedWorld, account: &str) -> String {
    world
        .borrow()
        .bookings
        .get(account)
        .cloned()
        .unwrap_or_else(|| panic!("{account} holds no booking"))
}

/// The last recorded reply.
pub(crate) fn last_reply(world: &SharedWorld) -> Reply {
    world.borrow().last.clone().expect("a request was sent")
}
