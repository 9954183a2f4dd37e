//! Base fund API handlers.

use actix_web::{delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Fund, FundId, NewFund};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::responses::{AckResponse, CountResponse, CreatedResponse, DataResponse};
use crate::inbound::http::state::HttpState;

/// Balance update body for `POST /fund/update`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBalanceRequest {
    pub id: FundId,
    pub balance: i64,
}

/// List every fund.
#[utoipa::path(
    get,
    path = "/fund/funds",
    responses((status = 200, description = "Funds", body = DataResponse<Fund>)),
    tags = ["funds"],
    operation_id = "listFunds"
)]
#[get("/funds")]
pub async fn list_funds(state: web::Data<HttpState>) -> ApiResult<web::Json<DataResponse<Fund>>> {
    let funds = state.funds.fetch_all().await.map_err(Error::from)?;
    Ok(web::Json(DataResponse::new(funds)))
}

/// List funds whose balance exceeds a threshold (minor units).
#[utoipa::path(
    get,
    path = "/fund/funds-larger/{threshold}",
    params(("threshold" = i64, Path, description = "Exclusive balance floor in minor units")),
    responses((status = 200, description = "Funds above the threshold", body = DataResponse<Fund>)),
    tags = ["funds"],
    operation_id = "listFundsLarger"
)]
#[get("/funds-larger/{threshold}")]
pub async fn funds_larger(
    state: web::Data<HttpState>,
    threshold: web::Path<i64>,
) -> ApiResult<web::Json<DataResponse<Fund>>> {
    let funds = state
        .funds
        .with_balance_above(threshold.into_inner())
        .await
        .map_err(Error::from)?;
    Ok(web::Json(DataResponse::new(funds)))
}

/// Delete a fund; the subtype row and donations cascade away with it.
#[utoipa::path(
    delete,
    path = "/fund/{id}",
    params(("id" = i64, Path, description = "Fund identifier")),
    responses(
        (status = 200, description = "Fund deleted", body = AckResponse),
        (status = 404, description = "No such fund", body = crate::inbound::http::ApiError)
    ),
    tags = ["funds"],
    operation_id = "deleteFund"
)]
#[delete("/{id}")]
pub async fn delete_fund(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<web::Json<AckResponse>> {
    state
        .funds
        .delete(FundId(id.into_inner()))
        .await
        .map_err(Error::from)?;
    Ok(web::Json(AckResponse::ok()))
}

/// Drop and recreate the funds table.
#[utoipa::path(
    post,
    path = "/fund/initiate",
    responses((status = 200, description = "Table recreated", body = AckResponse)),
    tags = ["funds"],
    operation_id = "initiateFunds"
)]
#[post("/initiate")]
pub async fn initiate(state: web::Data<HttpState>) -> ApiResult<web::Json<AckResponse>> {
    state.funds.initialize().await.map_err(Error::from)?;
    Ok(web::Json(AckResponse::ok()))
}

/// Insert a base fund row.
#[utoipa::path(
    post,
    path = "/fund/insert",
    request_body = NewFund,
    responses(
        (status = 200, description = "Fund created", body = CreatedResponse),
        (status = 400, description = "Blank purpose or verification", body = crate::inbound::http::ApiError)
    ),
    tags = ["funds"],
    operation_id = "insertFund"
)]
#[post("/insert")]
pub async fn insert(
    state: web::Data<HttpState>,
    payload: web::Json<NewFund>,
) -> ApiResult<web::Json<CreatedResponse>> {
    let fund = payload
        .into_inner()
        .validated()
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let id = state.funds.insert(&fund).await.map_err(Error::from)?;
    Ok(web::Json(CreatedResponse::new(id.0)))
}

/// Replace a fund's balance.
#[utoipa::path(
    post,
    path = "/fund/update",
    request_body = UpdateBalanceRequest,
    responses(
        (status = 200, description = "Balance updated", body = AckResponse),
        (status = 404, description = "No such fund", body = crate::inbound::http::ApiError)
    ),
    tags = ["funds"],
    operation_id = "updateFundBalance"
)]
#[post("/update")]
pub async fn update(
    state: web::Data<HttpState>,
    payload: web::Json<UpdateBalanceRequest>,
) -> ApiResult<web::Json<AckResponse>> {
    state
        .funds
        .update_balance(payload.id, payload.balance)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(AckResponse::ok()))
}

/// Count fund rows.
#[utoipa::path(
    get,
    path = "/fund/count",
    responses((status = 200, description = "Row count", body = CountResponse)),
    tags = ["funds"],
    operation_id = "countFunds"
)]
#[get("/count")]
pub async fn count(state: web::Data<HttpState>) -> ApiResult<web::Json<CountResponse>> {
    let count = state.funds.count().await.map_err(Error::from)?;
    Ok(web::Json(CountResponse::new(count)))
}
