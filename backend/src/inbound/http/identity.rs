//! The authorization gate as an Actix extractor.
//!
//! A session token is read from `Authorization: Bearer <token>` or, failing
//! that, from the `token` cookie, and resolved to an [`Identity`] through the
//! credential service. Handlers that take [`Authenticated`] are protected;
//! role checks are a further `identity.authorize(&[..])` call.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, Identity, NOT_AUTHORIZED_MESSAGE, Role};

use super::state::HttpState;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Authenticated caller extracted from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated(pub Identity);

impl Authenticated {
    /// The resolved identity.
    pub const fn identity(&self) -> &Identity {
        &self.0
    }

    /// Reject the request with 403 unless the caller holds one of `roles`.
    pub fn require(&self, roles: &[Role]) -> Result<&Identity, Error> {
        self.0.authorize(roles).map(|()| &self.0)
    }
}

/// Pull the raw token from the bearer header or the session cookie.
pub(crate) fn session_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned);
    bearer.or_else(|| {
        req.cookie(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_owned())
            .filter(|token| !token.is_empty() && token != "none")
    })
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = session_token(req);
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not registered"))?;
            let token = token.ok_or_else(|| Error::unauthorized(NOT_AUTHORIZED_MESSAGE))?;
            let identity = state.credentials.resolve_identity(&token).await?;
            Ok(Self(identity))
        })
    }
}
