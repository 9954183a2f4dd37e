//! Individual fund API handlers.
//!
//! Writes to the subtype touch two tables, so insert and update stay
//! atomic in the adapter; handlers only shape payloads and errors.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, FundId, FundPatch, IndividualFundPatch, NewFund, OwnedFund, Ssn};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::guard::AuthenticatedPrincipal;
use crate::inbound::http::responses::{AckResponse, CountResponse, CreatedResponse, DataResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::parse_email;

/// Flat body for `POST /ind-fund/insert`: base fund fields plus the
/// individual subtype columns.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertIndividualFundRequest {
    pub purpose: String,
    pub balance: i64,
    pub verification: String,
    pub ssn: i64,
    pub user_email: String,
}

/// Flat body for `POST /ind-fund/update`. Absent fields are untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIndividualFundRequest {
    pub id: FundId,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub balance: Option<i64>,
    #[serde(default)]
    pub verification: Option<String>,
    #[serde(default)]
    pub ssn: Option<i64>,
    #[serde(default)]
    pub user_email: Option<String>,
}

fn parse_ssn(raw: i64) -> Result<Ssn, Error> {
    Ssn::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(serde_json::json!({ "field": "ssn" }))
    })
}

/// List every individual fund joined with its base row.
#[utoipa::path(
    get,
    path = "/ind-fund/",
    responses((status = 200, description = "Individual funds", body = DataResponse<OwnedFund>)),
    tags = ["individual-funds"],
    operation_id = "listIndividualFunds"
)]
#[get("/")]
pub async fn list(state: web::Data<HttpState>) -> ApiResult<web::Json<DataResponse<OwnedFund>>> {
    let funds = state
        .individual_funds
        .fetch_all()
        .await
        .map_err(Error::from)?;
    Ok(web::Json(DataResponse::new(funds)))
}

/// Drop and recreate the individual funds table.
#[utoipa::path(
    post,
    path = "/ind-fund/initiate",
    responses((status = 200, description = "Table recreated", body = AckResponse)),
    tags = ["individual-funds"],
    operation_id = "initiateIndividualFunds"
)]
#[post("/initiate")]
pub async fn initiate(state: web::Data<HttpState>) -> ApiResult<web::Json<AckResponse>> {
    state
        .individual_funds
        .initialize()
        .await
        .map_err(Error::from)?;
    Ok(web::Json(AckResponse::ok()))
}

/// Create a fund together with its individual owner row.
#[utoipa::path(
    post,
    path = "/ind-fund/insert",
    request_body = InsertIndividualFundRequest,
    responses(
        (status = 200, description = "Fund created", body = CreatedResponse),
        (status = 401, description = "Missing or invalid token", body = crate::inbound::http::ApiError)
    ),
    security(("bearer" = [])),
    tags = ["individual-funds"],
    operation_id = "insertIndividualFund"
)]
#[post("/insert")]
pub async fn insert(
    _principal: AuthenticatedPrincipal,
    state: web::Data<HttpState>,
    payload: web::Json<InsertIndividualFundRequest>,
) -> ApiResult<web::Json<CreatedResponse>> {
    let payload = payload.into_inner();
    let ssn = parse_ssn(payload.ssn)?;
    let user_email = parse_email(&payload.user_email)?;
    let fund = NewFund {
        purpose: payload.purpose,
        balance: payload.balance,
        verification: payload.verification,
    }
    .validated()
    .map_err(|err| Error::invalid_request(err.to_string()))?;
    let id = state
        .individual_funds
        .insert(&fund, ssn, &user_email)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(CreatedResponse::new(id.0)))
}

/// Patch the base fund and its individual subtype row atomically.
#[utoipa::path(
    post,
    path = "/ind-fund/update",
    request_body = UpdateIndividualFundRequest,
    responses(
        (status = 200, description = "Fund updated", body = AckResponse),
        (status = 400, description = "No fields to change", body = crate::inbound::http::ApiError),
        (status = 404, description = "No such individual fund", body = crate::inbound::http::ApiError)
    ),
    security(("bearer" = [])),
    tags = ["individual-funds"],
    operation_id = "updateIndividualFund"
)]
#[post("/update")]
pub async fn update(
    _principal: AuthenticatedPrincipal,
    state: web::Data<HttpState>,
    payload: web::Json<UpdateIndividualFundRequest>,
) -> ApiResult<web::Json<AckResponse>> {
    let payload = payload.into_inner();
    let fund = FundPatch {
        purpose: payload.purpose,
        balance: payload.balance,
        verification: payload.verification,
    };
    let subtype = IndividualFundPatch {
        ssn: payload.ssn.map(parse_ssn).transpose()?,
        user_email: payload
            .user_email
            .as_deref()
            .map(parse_email)
            .transpose()?,
    };
    if fund.is_empty() && subtype.is_empty() {
        return Err(Error::invalid_request("no fields to update").into());
    }
    state
        .individual_funds
        .update_fund_and_subtype(payload.id, &fund, &subtype)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(AckResponse::ok()))
}

/// Count individual fund rows.
#[utoipa::path(
    get,
    path = "/ind-fund/counts",
    responses((status = 200, description = "Row count", body = CountResponse)),
    tags = ["individual-funds"],
    operation_id = "countIndividualFunds"
)]
#[get("/counts")]
pub async fn counts(state: web::Data<HttpState>) -> ApiResult<web::Json<CountResponse>> {
    let count = state.individual_funds.count().await.map_err(Error::from)?;
    Ok(web::Json(CountResponse::new(count)))
}
