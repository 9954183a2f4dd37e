//! Organization fund API handlers.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, FundId, FundPatch, NewFund, OrganizationFundPatch, OwnedFund, TaxId};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::guard::AuthenticatedPrincipal;
use crate::inbound::http::responses::{AckResponse, CountResponse, CreatedResponse, DataResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::parse_email;

/// Flat body for `POST /org-fund/insert`: base fund fields plus the
/// organization subtype columns.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertOrganizationFundRequest {
    pub purpose: String,
    pub balance: i64,
    pub verification: String,
    pub tax_id: i64,
    pub org_email: String,
}

/// Flat body for `POST /org-fund/update`. Absent fields are untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationFundRequest {
    pub id: FundId,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub balance: Option<i64>,
    #[serde(default)]
    pub verification: Option<String>,
    #[serde(default)]
    pub tax_id: Option<i64>,
}

fn parse_tax_id(raw: i64) -> Result<TaxId, Error> {
    TaxId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(serde_json::json!({ "field": "taxId" }))
    })
}

/// List every organization fund joined with its base row.
#[utoipa::path(
    get,
    path = "/org-fund/",
    responses((status = 200, description = "Organization funds", body = DataResponse<OwnedFund>)),
    tags = ["organization-funds"],
    operation_id = "listOrganizationFunds"
)]
#[get("/")]
pub async fn list(state: web::Data<HttpState>) -> ApiResult<web::Json<DataResponse<OwnedFund>>> {
    let funds = state
        .organization_funds
        .fetch_all()
        .await
        .map_err(Error::from)?;
    Ok(web::Json(DataResponse::new(funds)))
}

/// Drop and recreate the organization funds table.
#[utoipa::path(
    post,
    path = "/org-fund/initiate",
    responses((status = 200, description = "Table recreated", body = AckResponse)),
    tags = ["organization-funds"],
    operation_id = "initiateOrganizationFunds"
)]
#[post("/initiate")]
pub async fn initiate(state: web::Data<HttpState>) -> ApiResult<web::Json<AckResponse>> {
    state
        .organization_funds
        .initialize()
        .await
        .map_err(Error::from)?;
    Ok(web::Json(AckResponse::ok()))
}

/// Create a fund together with its organization owner row.
#[utoipa::path(
    post,
    path = "/org-fund/insert",
    request_body = InsertOrganizationFundRequest,
    responses(
        (status = 200, description = "Fund created", body = CreatedResponse),
        (status = 401, description = "Missing or invalid token", body = crate::inbound::http::ApiError),
        (status = 409, description = "Tax identifier already registered", body = crate::inbound::http::ApiError)
    ),
    security(("bearer" = [])),
    tags = ["organization-funds"],
    operation_id = "insertOrganizationFund"
)]
#[post("/insert")]
pub async fn insert(
    _principal: AuthenticatedPrincipal,
    state: web::Data<HttpState>,
    payload: web::Json<InsertOrganizationFundRequest>,
) -> ApiResult<web::Json<CreatedResponse>> {
    let payload = payload.into_inner();
    let tax_id = parse_tax_id(payload.tax_id)?;
    let org_email = parse_email(&payload.org_email)?;
    let fund = NewFund {
        purpose: payload.purpose,
        balance: payload.balance,
        verification: payload.verification,
    }
    .validated()
    .map_err(|err| Error::invalid_request(err.to_string()))?;
    let id = state
        .organization_funds
        .insert(&fund, tax_id, &org_email)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(CreatedResponse::new(id.0)))
}

/// Patch the base fund and its organization subtype row atomically.
#[utoipa::path(
    post,
    path = "/org-fund/update",
    request_body = UpdateOrganizationFundRequest,
    responses(
        (status = 200, description = "Fund updated", body = AckResponse),
        (status = 400, description = "No fields to change", body = crate::inbound::http::ApiError),
        (status = 404, description = "No such organization fund", body = crate::inbound::http::ApiError)
    ),
    security(("bearer" = [])),
    tags = ["organization-funds"],
    operation_id = "updateOrganizationFund"
)]
#[post("/update")]
pub async fn update(
    _principal: AuthenticatedPrincipal,
    state: web::Data<HttpState>,
    payload: web::Json<UpdateOrganizationFundRequest>,
) -> ApiResult<web::Json<AckResponse>> {
    let payload = payload.into_inner();
    let fund = FundPatch {
        purpose: payload.purpose,
        balance: payload.balance,
        verification: payload.verification,
    };
    let subtype = OrganizationFundPatch {
        tax_id: payload.tax_id.map(parse_tax_id).transpose()?,
    };
    if fund.is_empty() && subtype.is_empty() {
        return Err(Error::invalid_request("no fields to update").into());
    }
    state
        .organization_funds
        .update_fund_and_subtype(payload.id, &fund, &subtype)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(AckResponse::ok()))
}

/// Count organization fund rows.
#[utoipa::path(
    get,
    path = "/org-fund/counts",
    responses((status = 200, description = "Row count", body = CountResponse)),
    tags = ["organization-funds"],
    operation_id = "countOrganizationFunds"
)]
#[get("/counts")]
pub async fn counts(state: web::Data<HttpState>) -> ApiResult<web::Json<CountResponse>> {
    let count = state
        .organization_funds
        .count()
        .await
        .map_err(Error::from)?;
    Ok(web::Json(CountResponse::new(count)))
}
