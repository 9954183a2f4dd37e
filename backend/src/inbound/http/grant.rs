//! Token grant responses shared by the signup and login endpoints.
//!
//! A grant is delivered twice: in the JSON body for API clients and in an
//! http-only `jwt` cookie for browsers. The guard accepts either.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::HttpResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::SignedToken;
use crate::inbound::http::guard::JWT_COOKIE;

/// Body returned by signup and login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    /// Always `true`; failures use the error envelope instead.
    pub success: bool,
    /// Compact bearer token.
    pub token: String,
    /// When the token stops validating.
    pub expires_at: DateTime<Utc>,
}

/// Build the `200 OK` grant response with the `jwt` cookie attached.
pub fn grant_response(signed: SignedToken) -> HttpResponse {
    let max_age = (signed.expires_at - Utc::now()).num_seconds().max(0);
    let cookie = Cookie::build(JWT_COOKIE, signed.token.clone())
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(CookieDuration::seconds(max_age))
        .finish();

    HttpResponse::Ok().cookie(cookie).json(TokenGrant {
        success: true,
        token: signed.token,
        expires_at: signed.expires_at,
    })
}
