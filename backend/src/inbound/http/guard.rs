//! Authentication guard for protected routes.
//!
//! Extracting [`AuthenticatedPrincipal`] in a handler's signature is what
//! protects the route: extraction fails with `401 Unauthorized` unless the
//! request carries a valid token in the `Authorization: Bearer` header or the
//! http-only `jwt` cookie. The resolved principal is handed to the handler so
//! it never re-verifies the token.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, Principal};
use crate::inbound::http::state::HttpState;

/// Cookie the login endpoints set and this guard reads.
pub const JWT_COOKIE: &str = "jwt";

/// The verified principal behind a protected request.
#[derive(Clone)]
pub struct AuthenticatedPrincipal(pub Principal);

impl AuthenticatedPrincipal {
    /// The resolved principal.
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

/// Pull the raw token from the Bearer header, falling back to the cookie.
fn bearer_or_cookie_token(req: &HttpRequest) -> Option<String> {
    let header_token = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned);
    if header_token.is_some() {
        return header_token;
    }
    req.cookie(JWT_COOKIE).map(|cookie| cookie.value().to_owned())
}

impl FromRequest for AuthenticatedPrincipal {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_or_cookie_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let Some(state) = state else {
                return Err(crate::inbound::http::error::ApiError::from_domain(
                    Error::internal("authentication state not configured"),
                )
                .into());
            };
            let Some(token) = token else {
                return Err(crate::inbound::http::error::ApiError::from_domain(
                    Error::unauthorized("authentication required"),
                )
                .into());
            };
            let principal = state
                .auth
                .resolve(&token)
                .await
                .map_err(crate::inbound::http::error::ApiError::from_domain)?;
            Ok(Self(principal))
        })
    }
}
