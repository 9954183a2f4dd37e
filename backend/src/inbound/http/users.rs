//! Users API handlers.
//!
//! ```text
//! POST /users/signup {"email":"ada@example.org","password":"pw","name":"Ada","phoneNumber":"6045551234"}
//! POST /users/login {"email":"ada@example.org","password":"pw"}
//! GET  /users/users
//! POST /users/search-users {"conditions":[{"field":"name","op":"contains","value":"Ada"}]}
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{SearchCondition, SearchConnective, UserSearch};
use crate::domain::user::UserValidationError;
use crate::domain::{Credentials, Email, Error, PhoneNumber, PrincipalKind, User};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::grant::{grant_response, TokenGrant};
use crate::inbound::http::responses::{AckResponse, CountResponse, DataResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiError;

/// Signup request body for `POST /users/signup`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone_number: String,
}

/// Login request body for `POST /users/login` and `POST /org/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Phone update body for `POST /users/update-user-phone`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePhoneRequest {
    pub email: String,
    pub phone_number: String,
}

/// Structured search body for `POST /users/search-users`.
///
/// Replaces free-text filter strings: each condition names a column, an
/// operator, and a value, and one connective joins them all.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchUsersRequest {
    pub conditions: Vec<SearchCondition>,
    #[serde(default)]
    pub connective: SearchConnective,
}

pub(crate) fn map_user_validation_error(err: UserValidationError) -> Error {
    let field = match &err {
        UserValidationError::EmptyEmail
        | UserValidationError::InvalidEmail
        | UserValidationError::EmailTooLong { .. } => "email",
        UserValidationError::EmptyName | UserValidationError::NameTooLong { .. } => "name",
        UserValidationError::InvalidPhoneNumber => "phoneNumber",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

pub(crate) fn parse_email(raw: &str) -> Result<Email, ApiError> {
    Email::new(raw)
        .map_err(map_user_validation_error)
        .map_err(ApiError::from)
}

fn parse_user(email: &str, name: &str, phone_number: &str) -> Result<User, ApiError> {
    let email = parse_email(email)?;
    let phone_number = PhoneNumber::new(phone_number)
        .map_err(map_user_validation_error)
        .map_err(ApiError::from)?;
    User::new(email, name, phone_number)
        .map_err(map_user_validation_error)
        .map_err(ApiError::from)
}

pub(crate) fn parse_credentials(email: &str, password: &str) -> Result<Credentials, ApiError> {
    let email = parse_email(email)?;
    Credentials::new(email, password)
        .map_err(|err| Error::invalid_request(err.to_string()))
        .map_err(ApiError::from)
}

/// Register a user and return a signup token grant.
#[utoipa::path(
    post,
    path = "/users/signup",
    request_body = SignupUserRequest,
    responses(
        (status = 200, description = "Account created", body = TokenGrant),
        (status = 400, description = "Invalid request", body = crate::inbound::http::ApiError),
        (status = 409, description = "Email already in use", body = crate::inbound::http::ApiError)
    ),
    tags = ["users"],
    operation_id = "signupUser"
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupUserRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let user = parse_user(&payload.email, &payload.name, &payload.phone_number)?;
    if payload.password.is_empty() {
        return Err(Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password" }))
            .into());
    }
    let signed = state.auth.signup_user(&user, &payload.password).await?;
    Ok(grant_response(signed))
}

/// Verify user credentials and return a login token grant.
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = TokenGrant),
        (status = 401, description = "Invalid credentials", body = crate::inbound::http::ApiError)
    ),
    tags = ["users"],
    operation_id = "loginUser"
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = parse_credentials(&payload.email, &payload.password)?;
    let signed = state.auth.login(PrincipalKind::User, &credentials).await?;
    Ok(grant_response(signed))
}

/// Probe database connectivity by checking out a pooled connection.
#[utoipa::path(
    get,
    path = "/users/check-db-connection",
    responses(
        (status = 200, description = "Database reachable", body = AckResponse),
        (status = 503, description = "Database unreachable", body = crate::inbound::http::ApiError)
    ),
    tags = ["users"],
    operation_id = "checkDbConnection"
)]
#[get("/check-db-connection")]
pub async fn check_db_connection(state: web::Data<HttpState>) -> ApiResult<web::Json<AckResponse>> {
    state.users.ping().await.map_err(Error::from)?;
    Ok(web::Json(AckResponse::ok()))
}

/// List every user.
#[utoipa::path(
    get,
    path = "/users/users",
    responses((status = 200, description = "Users", body = DataResponse<User>)),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<DataResponse<User>>> {
    let users = state.users.fetch_all().await.map_err(Error::from)?;
    Ok(web::Json(DataResponse::new(users)))
}

/// Drop and recreate the users table.
#[utoipa::path(
    post,
    path = "/users/initiate",
    responses((status = 200, description = "Table recreated", body = AckResponse)),
    tags = ["users"],
    operation_id = "initiateUsers"
)]
#[post("/initiate")]
pub async fn initiate(state: web::Data<HttpState>) -> ApiResult<web::Json<AckResponse>> {
    state.users.initialize().await.map_err(Error::from)?;
    Ok(web::Json(AckResponse::ok()))
}

/// Run a structured search over users.
#[utoipa::path(
    post,
    path = "/users/search-users",
    request_body = SearchUsersRequest,
    responses(
        (status = 200, description = "Matching users", body = DataResponse<User>),
        (status = 400, description = "Empty condition list", body = crate::inbound::http::ApiError)
    ),
    tags = ["users"],
    operation_id = "searchUsers"
)]
#[post("/search-users")]
pub async fn search_users(
    state: web::Data<HttpState>,
    payload: web::Json<SearchUsersRequest>,
) -> ApiResult<web::Json<DataResponse<User>>> {
    let payload = payload.into_inner();
    let search = UserSearch::new(payload.conditions, payload.connective)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let users = state.users.search(&search).await.map_err(Error::from)?;
    Ok(web::Json(DataResponse::new(users)))
}

/// Insert a user without issuing a token.
#[utoipa::path(
    post,
    path = "/users/insert-user",
    request_body = SignupUserRequest,
    responses(
        (status = 200, description = "User inserted", body = AckResponse),
        (status = 409, description = "Email already in use", body = crate::inbound::http::ApiError)
    ),
    tags = ["users"],
    operation_id = "insertUser"
)]
#[post("/insert-user")]
pub async fn insert_user(
    state: web::Data<HttpState>,
    payload: web::Json<SignupUserRequest>,
) -> ApiResult<web::Json<AckResponse>> {
    let payload = payload.into_inner();
    let user = parse_user(&payload.email, &payload.name, &payload.phone_number)?;
    if payload.password.is_empty() {
        return Err(Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password" }))
            .into());
    }
    // Same conflict checks and hashing as signup; the grant is discarded.
    state.auth.signup_user(&user, &payload.password).await?;
    Ok(web::Json(AckResponse::ok()))
}

/// Replace a user's phone number.
#[utoipa::path(
    post,
    path = "/users/update-user-phone",
    request_body = UpdatePhoneRequest,
    responses(
        (status = 200, description = "Phone number updated", body = AckResponse),
        (status = 404, description = "No such user", body = crate::inbound::http::ApiError)
    ),
    tags = ["users"],
    operation_id = "updateUserPhone"
)]
#[post("/update-user-phone")]
pub async fn update_user_phone(
    state: web::Data<HttpState>,
    payload: web::Json<UpdatePhoneRequest>,
) -> ApiResult<web::Json<AckResponse>> {
    let email = parse_email(&payload.email)?;
    let phone_number = PhoneNumber::new(&payload.phone_number)
        .map_err(map_user_validation_error)
        .map_err(ApiError::from)?;
    state
        .users
        .update_phone_number(&email, &phone_number)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(AckResponse::ok()))
}

/// Count user rows.
#[utoipa::path(
    get,
    path = "/users/counts",
    responses((status = 200, description = "Row count", body = CountResponse)),
    tags = ["users"],
    operation_id = "countUsers"
)]
#[get("/counts")]
pub async fn counts(state: web::Data<HttpState>) -> ApiResult<web::Json<CountResponse>> {
    let count = state.users.count().await.map_err(Error::from)?;
    Ok(web::Json(CountResponse::new(count)))
}
