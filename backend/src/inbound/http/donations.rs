//! Donation API handlers, including the two analytic reports.

use actix_web::{get, post, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Donation, DonationId, Donor, Email, Error, FundDonationTotal, FundId, NewDonation, Principal,
};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::guard::AuthenticatedPrincipal;
use crate::inbound::http::responses::{AckResponse, CountResponse, CreatedResponse, DataResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::parse_email;

/// Flat donation body. On insert the donor is the authenticated caller
/// and the email fields are ignored; on update exactly one of `userEmail`
/// and `orgEmail` names the donor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertDonationRequest {
    pub amount: i64,
    pub donated_on: NaiveDate,
    pub content: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub org_email: Option<String>,
    pub fund_id: FundId,
}

/// Full-row donation update body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDonationRequest {
    pub id: DonationId,
    #[serde(flatten)]
    pub donation: InsertDonationRequest,
}

fn parse_donation(
    payload: InsertDonationRequest,
) -> Result<NewDonation, crate::inbound::http::ApiError> {
    let user_email = payload.user_email.as_deref().map(parse_email).transpose()?;
    let org_email = payload.org_email.as_deref().map(parse_email).transpose()?;
    let donor = Donor::from_emails(user_email, org_email)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    Ok(NewDonation {
        amount: payload.amount,
        donated_on: payload.donated_on,
        content: payload.content,
        donor,
        fund_id: payload.fund_id,
    }
    .validated()
    .map_err(|err| Error::invalid_request(err.to_string()))?)
}

/// List every donation.
#[utoipa::path(
    get,
    path = "/donations/",
    responses((status = 200, description = "Donations", body = DataResponse<Donation>)),
    tags = ["donations"],
    operation_id = "listDonations"
)]
#[get("/")]
pub async fn list(state: web::Data<HttpState>) -> ApiResult<web::Json<DataResponse<Donation>>> {
    let donations = state.donations.fetch_all().await.map_err(Error::from)?;
    Ok(web::Json(DataResponse::new(donations)))
}

/// List donations made by one user.
#[utoipa::path(
    get,
    path = "/donations/by-user/{email}",
    params(("email" = String, Path, description = "Donating user's email")),
    responses((status = 200, description = "The user's donations", body = DataResponse<Donation>)),
    tags = ["donations"],
    operation_id = "listDonationsByUser"
)]
#[get("/by-user/{email}")]
pub async fn by_user(
    state: web::Data<HttpState>,
    email: web::Path<String>,
) -> ApiResult<web::Json<DataResponse<Donation>>> {
    let email = parse_email(&email)?;
    let donations = state
        .donations
        .for_user(&email)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(DataResponse::new(donations)))
}

/// Users who have donated to every fund.
#[utoipa::path(
    get,
    path = "/donations/donated-all",
    responses((status = 200, description = "Donor emails", body = DataResponse<Email>)),
    tags = ["donations"],
    operation_id = "donorsInEveryFund"
)]
#[get("/donated-all")]
pub async fn donated_all(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<DataResponse<Email>>> {
    let donors = state
        .donations
        .donors_in_every_fund()
        .await
        .map_err(Error::from)?;
    Ok(web::Json(DataResponse::new(donors)))
}

/// Funds whose donation total beats the cross-fund average.
#[utoipa::path(
    get,
    path = "/donations/above-average",
    responses((
        status = 200,
        description = "Funds with above-average totals",
        body = DataResponse<FundDonationTotal>
    )),
    tags = ["donations"],
    operation_id = "fundsAboveAverage"
)]
#[get("/above-average")]
pub async fn above_average(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<DataResponse<FundDonationTotal>>> {
    let totals = state
        .donations
        .funds_above_average()
        .await
        .map_err(Error::from)?;
    Ok(web::Json(DataResponse::new(totals)))
}

/// Drop and recreate the donations table.
#[utoipa::path(
    post,
    path = "/donations/initiate",
    responses((status = 200, description = "Table recreated", body = AckResponse)),
    tags = ["donations"],
    operation_id = "initiateDonations"
)]
#[post("/initiate")]
pub async fn initiate(state: web::Data<HttpState>) -> ApiResult<web::Json<AckResponse>> {
    state.donations.initialize().await.map_err(Error::from)?;
    Ok(web::Json(AckResponse::ok()))
}

/// Record a donation made by the authenticated caller.
///
/// The donor is always the token's principal; any `userEmail`/`orgEmail`
/// in the body is ignored, so callers cannot attribute donations to other
/// accounts.
#[utoipa::path(
    post,
    path = "/donations/insert",
    request_body = InsertDonationRequest,
    responses(
        (status = 200, description = "Donation recorded", body = CreatedResponse),
        (status = 400, description = "Invalid amount", body = crate::inbound::http::ApiError),
        (status = 401, description = "Missing or invalid token", body = crate::inbound::http::ApiError),
        (status = 404, description = "Unknown fund", body = crate::inbound::http::ApiError)
    ),
    security(("bearer" = [])),
    tags = ["donations"],
    operation_id = "insertDonation"
)]
#[post("/insert")]
pub async fn insert(
    principal: AuthenticatedPrincipal,
    state: web::Data<HttpState>,
    payload: web::Json<InsertDonationRequest>,
) -> ApiResult<web::Json<CreatedResponse>> {
    let payload = payload.into_inner();
    let donor = match principal.principal() {
        Principal::User { user } => Donor::User {
            email: user.email.clone(),
        },
        Principal::Organization { organization } => Donor::Organization {
            email: organization.email.clone(),
        },
    };
    let donation = NewDonation {
        amount: payload.amount,
        donated_on: payload.donated_on,
        content: payload.content,
        donor,
        fund_id: payload.fund_id,
    }
    .validated()
    .map_err(|err| Error::invalid_request(err.to_string()))?;
    let id = state
        .donations
        .insert(&donation)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(CreatedResponse::new(id.0)))
}

/// Replace every mutable field of a donation.
#[utoipa::path(
    post,
    path = "/donations/update",
    request_body = UpdateDonationRequest,
    responses(
        (status = 200, description = "Donation updated", body = AckResponse),
        (status = 404, description = "No such donation", body = crate::inbound::http::ApiError)
    ),
    tags = ["donations"],
    operation_id = "updateDonation"
)]
#[post("/update")]
pub async fn update(
    state: web::Data<HttpState>,
    payload: web::Json<UpdateDonationRequest>,
) -> ApiResult<web::Json<AckResponse>> {
    let payload = payload.into_inner();
    let donation = parse_donation(payload.donation)?;
    state
        .donations
        .update(payload.id, &donation)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(AckResponse::ok()))
}

/// Count donation rows.
#[utoipa::path(
    get,
    path = "/donations/count",
    responses((status = 200, description = "Row count", body = CountResponse)),
    tags = ["donations"],
    operation_id = "countDonations"
)]
#[get("/count")]
pub async fn count(state: web::Data<HttpState>) -> ApiResult<web::Json<CountResponse>> {
    let count = state.donations.count().await.map_err(Error::from)?;
    Ok(web::Json(CountResponse::new(count)))
}
