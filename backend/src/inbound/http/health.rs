//! Liveness and readiness probes.

use actix_web::{get, web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::state::HttpState;

/// Probe response payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `"ok"` when the probe passed.
    pub status: &'static str,
}

/// Process-is-up probe; never touches the database.
#[utoipa::path(
    get,
    path = "/healthz/live",
    responses((status = 200, description = "Process is up", body = HealthResponse)),
    tags = ["health"],
    operation_id = "livenessProbe"
)]
#[get("/live")]
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse { status: "ok" })
}

/// Readiness probe; checks out a database connection.
#[utoipa::path(
    get,
    path = "/healthz/ready",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = crate::inbound::http::ApiError)
    ),
    tags = ["health"],
    operation_id = "readinessProbe"
)]
#[get("/ready")]
pub async fn ready(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    state.users.ping().await.map_err(Error::from)?;
    Ok(HttpResponse::Ok().json(HealthResponse { status: "ok" }))
}
