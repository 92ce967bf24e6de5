//! Account and session handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"name":"Ada","telephoneNumber":"0812345678","email":"ada@example.com","password":"secret1"}
//! POST /api/v1/auth/login {"email":"ada@example.com","password":"secret1"}
//! GET  /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! PUT  /api/v1/auth/me {"name":"Ada L."}
//! PUT  /api/v1/auth/change-password {"currentPassword":"secret1","newPassword":"secret2"}
//! ```
//!
//! Successful registration, login, and password changes respond with
//! `{ "success": true, "token": ... }` and set the `token` cookie.

use actix_web::cookie::time::{Duration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    LoginCredentials, PasswordChange, ProfileUpdate, Registration, SessionToken, TelephoneNumber,
    User, UserName,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::identity::{Authenticated, SESSION_COOKIE};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::{HttpState, SessionCookieSettings};
use crate::inbound::http::validation::{map_credential_error, map_user_error};

/// Request body for `POST /api/v1/auth/register`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub telephone_number: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = crate::domain::CredentialValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            value.name.as_deref().unwrap_or_default(),
            value.telephone_number.as_deref().unwrap_or_default(),
            value.email.as_deref().unwrap_or_default(),
            value.password.as_deref().unwrap_or_default(),
        )
    }
}

/// Request body for `POST /api/v1/auth/login`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = crate::domain::CredentialValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            value.email.as_deref().unwrap_or_default(),
            value.password.as_deref().unwrap_or_default(),
        )
    }
}

/// Request body for `PUT /api/v1/auth/me`. Any other field is ignored.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub telephone_number: Option<String>,
}

impl TryFrom<UpdateMeRequest> for ProfileUpdate {
    type Error = crate::domain::UserValidationError;

    fn try_from(value: UpdateMeRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name.map(UserName::new).transpose()?,
            telephone_number: value
                .telephone_number
                .map(TelephoneNumber::new)
                .transpose()?,
        })
    }
}

/// Request body for `PUT /api/v1/auth/change-password`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Public view of an account. The password hash never leaves the domain.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub telephone_number: String,
    pub email: String,
    #[schema(example = "user")]
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            name: user.name.to_string(),
            telephone_number: user.telephone_number.to_string(),
            email: user.email.to_string(),
            role: user.role.as_str().to_owned(),
            created_at: user.created_at,
        }
    }
}

fn session_cookie(token: &SessionToken, settings: SessionCookieSettings) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token.as_str().to_owned())
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(i64::from(settings.max_age_days)))
        .finish()
}

fn token_response(token: &SessionToken, settings: SessionCookieSettings) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(session_cookie(token, settings))
        .json(Envelope::token(token.as_str()))
}

/// Create a `user` account and open a session for it.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered; token returned and set as cookie",
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid or duplicate field", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from(payload.into_inner()).map_err(map_credential_error)?;
    let session = state.credentials.register(&registration).await?;
    Ok(token_response(&session.token, state.session_cookie))
}

/// Verify an email and password and open a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; token returned and set as cookie",
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Email or password missing", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_credential_error)?;
    let session = state.credentials.authenticate(&credentials).await?;
    Ok(token_response(&session.token, state.session_cookie))
}

/// Overwrite the session cookie with an expired placeholder.
#[utoipa::path(
    get,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared")
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[get("/auth/logout")]
pub async fn logout(state: web::Data<HttpState>) -> HttpResponse {
    let cookie = Cookie::build(SESSION_COOKIE, "none")
        .path("/")
        .http_only(true)
        .secure(state.session_cookie.secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .finish();
    HttpResponse::Ok()
        .cookie(cookie)
        .json(Envelope::message("Logged out"))
}

/// Return the caller's own profile.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authorized", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "getMe"
)]
#[get("/auth/me")]
pub async fn get_me(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Envelope<UserResponse>>> {
    let user = state
        .credentials
        .current_user(&caller.identity().user_id)
        .await?;
    Ok(web::Json(Envelope::data(UserResponse::from(&user))))
}

/// Change the caller's name or telephone number. Other fields are ignored.
#[utoipa::path(
    put,
    path = "/api/v1/auth/me",
    request_body = UpdateMeRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid or duplicate field", body = ErrorSchema),
        (status = 401, description = "Not authorized", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "updateMe"
)]
#[put("/auth/me")]
pub async fn update_me(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<UpdateMeRequest>,
) -> ApiResult<web::Json<Envelope<UserResponse>>> {
    let update = ProfileUpdate::try_from(payload.into_inner()).map_err(map_user_error)?;
    let user = state
        .credentials
        .update_profile(&caller.identity().user_id, &update)
        .await?;
    Ok(web::Json(Envelope::data(UserResponse::from(&user))))
}

/// Rotate the caller's password and issue a fresh session.
#[utoipa::path(
    put,
    path = "/api/v1/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed; new token returned",
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "New password too short", body = ErrorSchema),
        (status = 401, description = "Current password wrong or not authorized", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "changePassword"
)]
#[put("/auth/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let ChangePasswordRequest {
        current_password,
        new_password,
    } = payload.into_inner();
    let change = PasswordChange::try_from_parts(
        current_password.as_deref().unwrap_or_default(),
        new_password.as_deref().unwrap_or_default(),
    )
    .map_err(map_credential_error)?;
    let user_id = caller.identity().user_id;
    state.credentials.change_password(&user_id, &change).await?;
    let token = state.credentials.issue_session_token(&user_id).await?;
    Ok(token_response(&token, state.session_cookie))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
