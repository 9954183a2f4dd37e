//! Volunteer organization API handlers.

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use utoipa::ToSchema;

use crate::domain::organization::OrganizationValidationError;
use crate::domain::{Error, Organization, OrganizationColumn, PrincipalKind};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::grant::{grant_response, TokenGrant};
use crate::inbound::http::responses::{AckResponse, CountResponse, DataResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{parse_credentials, parse_email};
use crate::inbound::http::ApiError;

/// Signup request body for `POST /org/signup`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupOrganizationRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub field: String,
    pub address: String,
    pub verification: String,
}

/// Detail update body for `POST /org/update`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationRequest {
    pub email: String,
    pub address: String,
    pub name: String,
    pub field: String,
}

/// Column selection body for `POST /org/projection`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRequest {
    pub columns: Vec<OrganizationColumn>,
}

fn map_organization_validation_error(err: OrganizationValidationError) -> Error {
    let field = match &err {
        OrganizationValidationError::EmptyField { field }
        | OrganizationValidationError::FieldTooLong { field, .. } => *field,
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

fn parse_organization(payload: &SignupOrganizationRequest) -> Result<Organization, ApiError> {
    let email = parse_email(&payload.email)?;
    Organization::new(
        email,
        &payload.name,
        &payload.field,
        &payload.address,
        &payload.verification,
    )
    .map_err(map_organization_validation_error)
    .map_err(ApiError::from)
}

/// Register an organization and return a signup token grant.
#[utoipa::path(
    post,
    path = "/org/signup",
    request_body = SignupOrganizationRequest,
    responses(
        (status = 200, description = "Account created", body = TokenGrant),
        (status = 400, description = "Invalid request", body = crate::inbound::http::ApiError),
        (status = 409, description = "Email already in use", body = crate::inbound::http::ApiError)
    ),
    tags = ["organizations"],
    operation_id = "signupOrganization"
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupOrganizationRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let organization = parse_organization(&payload)?;
    if payload.password.is_empty() {
        return Err(Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password" }))
            .into());
    }
    let signed = state
        .auth
        .signup_organization(&organization, &payload.password)
        .await?;
    Ok(grant_response(signed))
}

/// Verify organization credentials and return a login token grant.
#[utoipa::path(
    post,
    path = "/org/login",
    request_body = crate::inbound::http::users::LoginRequest,
    responses(
        (status = 200, description = "Login success", body = TokenGrant),
        (status = 401, description = "Invalid credentials", body = crate::inbound::http::ApiError)
    ),
    tags = ["organizations"],
    operation_id = "loginOrganization"
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<crate::inbound::http::users::LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = parse_credentials(&payload.email, &payload.password)?;
    let signed = state
        .auth
        .login(PrincipalKind::Organization, &credentials)
        .await?;
    Ok(grant_response(signed))
}

/// Select a validated subset of columns over every organization.
#[utoipa::path(
    post,
    path = "/org/projection",
    request_body = ProjectionRequest,
    responses(
        (status = 200, description = "Projected rows"),
        (status = 400, description = "Empty column list", body = crate::inbound::http::ApiError)
    ),
    tags = ["organizations"],
    operation_id = "projectOrganizations"
)]
#[post("/projection")]
pub async fn projection(
    state: web::Data<HttpState>,
    payload: web::Json<ProjectionRequest>,
) -> ApiResult<web::Json<DataResponse<Map<String, Value>>>> {
    let columns = payload.into_inner().columns;
    if columns.is_empty() {
        return Err(Error::invalid_request("at least one column is required").into());
    }
    let rows = state
        .organizations
        .projection(&columns)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(DataResponse::new(rows)))
}

/// List every organization.
#[utoipa::path(
    get,
    path = "/org/organizations",
    responses((status = 200, description = "Organizations", body = DataResponse<Organization>)),
    tags = ["organizations"],
    operation_id = "listOrganizations"
)]
#[get("/organizations")]
pub async fn list_organizations(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<DataResponse<Organization>>> {
    let organizations = state.organizations.fetch_all().await.map_err(Error::from)?;
    Ok(web::Json(DataResponse::new(organizations)))
}

/// Drop and recreate the organizations table.
#[utoipa::path(
    post,
    path = "/org/initiate",
    responses((status = 200, description = "Table recreated", body = AckResponse)),
    tags = ["organizations"],
    operation_id = "initiateOrganizations"
)]
#[post("/initiate")]
pub async fn initiate(state: web::Data<HttpState>) -> ApiResult<web::Json<AckResponse>> {
    state.organizations.initialize().await.map_err(Error::from)?;
    Ok(web::Json(AckResponse::ok()))
}

/// Insert an organization without issuing a token.
#[utoipa::path(
    post,
    path = "/org/insert",
    request_body = SignupOrganizationRequest,
    responses(
        (status = 200, description = "Organization inserted", body = AckResponse),
        (status = 409, description = "Duplicate email or (name, field)", body = crate::inbound::http::ApiError)
    ),
    tags = ["organizations"],
    operation_id = "insertOrganization"
)]
#[post("/insert")]
pub async fn insert(
    state: web::Data<HttpState>,
    payload: web::Json<SignupOrganizationRequest>,
) -> ApiResult<web::Json<AckResponse>> {
    let payload = payload.into_inner();
    let organization = parse_organization(&payload)?;
    if payload.password.is_empty() {
        return Err(Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password" }))
            .into());
    }
    state
        .auth
        .signup_organization(&organization, &payload.password)
        .await?;
    Ok(web::Json(AckResponse::ok()))
}

/// Replace an organization's address, name, and field of work.
#[utoipa::path(
    post,
    path = "/org/update",
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, description = "Details updated", body = AckResponse),
        (status = 404, description = "No such organization", body = crate::inbound::http::ApiError)
    ),
    tags = ["organizations"],
    operation_id = "updateOrganization"
)]
#[post("/update")]
pub async fn update(
    state: web::Data<HttpState>,
    payload: web::Json<UpdateOrganizationRequest>,
) -> ApiResult<web::Json<AckResponse>> {
    let email = parse_email(&payload.email)?;
    state
        .organizations
        .update_details(&email, &payload.address, &payload.name, &payload.field)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(AckResponse::ok()))
}

/// Count organization rows.
#[utoipa::path(
    get,
    path = "/org/counts",
    responses((status = 200, description = "Row count", body = CountResponse)),
    tags = ["organizations"],
    operation_id = "countOrganizations"
)]
#[get("/counts")]
pub async fn counts(state: web::Data<HttpState>) -> ApiResult<web::Json<CountResponse>> {
    let count = state.organizations.count().await.map_err(Error::from)?;
    Ok(web::Json(CountResponse::new(count)))
}
