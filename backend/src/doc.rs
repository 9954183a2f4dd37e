//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] aggregates every HTTP endpoint with the request and response
//! schemas they reference. The generated document backs Swagger UI in debug
//! builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{FundDonationTotal, SearchCondition, SearchConnective, SearchOperator, UserSearchField};
use crate::domain::{
    Donation, DonationId, Donor, Email, ErrorCode, Fund, FundId, FundOwnership, NewFund,
    Organization, OrganizationColumn, OwnedFund, PhoneNumber, Ssn, TaxId, User,
};
use crate::inbound::http::donations::{InsertDonationRequest, UpdateDonationRequest};
use crate::inbound::http::funds::UpdateBalanceRequest;
use crate::inbound::http::health::HealthResponse;
use crate::inbound::http::individual_funds::{
    InsertIndividualFundRequest, UpdateIndividualFundRequest,
};
use crate::inbound::http::organization_funds::{
    InsertOrganizationFundRequest, UpdateOrganizationFundRequest,
};
use crate::inbound::http::organizations::{
    ProjectionRequest, SignupOrganizationRequest, UpdateOrganizationRequest,
};
use crate::inbound::http::users::{
    LoginRequest, SearchUsersRequest, SignupUserRequest, UpdatePhoneRequest,
};
use crate::inbound::http::{
    AckResponse, ApiError, CountResponse, CreatedResponse, TokenGrant,
};

/// Register the bearer and cookie token schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "jwt",
                "Token cookie issued by the signup and login endpoints.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Givelog backend API",
        description = "Volunteer donation bookkeeping over users, organizations, funds, and donations."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::signup,
        crate::inbound::http::users::login,
        crate::inbound::http::users::check_db_connection,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::initiate,
        crate::inbound::http::users::search_users,
        crate::inbound::http::users::insert_user,
        crate::inbound::http::users::update_user_phone,
        crate::inbound::http::users::counts,
        crate::inbound::http::organizations::signup,
        crate::inbound::http::organizations::login,
        crate::inbound::http::organizations::projection,
        crate::inbound::http::organizations::list_organizations,
        crate::inbound::http::organizations::initiate,
        crate::inbound::http::organizations::insert,
        crate::inbound::http::organizations::update,
        crate::inbound::http::organizations::counts,
        crate::inbound::http::funds::list_funds,
        crate::inbound::http::funds::funds_larger,
        crate::inbound::http::funds::delete_fund,
        crate::inbound::http::funds::initiate,
        crate::inbound::http::funds::insert,
        crate::inbound::http::funds::update,
        crate::inbound::http::funds::count,
        crate::inbound::http::individual_funds::list,
        crate::inbound::http::individual_funds::initiate,
        crate::inbound::http::individual_funds::insert,
        crate::inbound::http::individual_funds::update,
        crate::inbound::http::individual_funds::counts,
        crate::inbound::http::organization_funds::list,
        crate::inbound::http::organization_funds::initiate,
        crate::inbound::http::organization_funds::insert,
        crate::inbound::http::organization_funds::update,
        crate::inbound::http::organization_funds::counts,
        crate::inbound::http::donations::list,
        crate::inbound::http::donations::by_user,
        crate::inbound::http::donations::donated_all,
        crate::inbound::http::donations::above_average,
        crate::inbound::http::donations::initiate,
        crate::inbound::http::donations::insert,
        crate::inbound::http::donations::update,
        crate::inbound::http::donations::count,
        crate::inbound::http::health::live,
        crate::inbound::http::health::ready,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        AckResponse,
        CountResponse,
        CreatedResponse,
        TokenGrant,
        HealthResponse,
        Email,
        PhoneNumber,
        User,
        Organization,
        OrganizationColumn,
        Fund,
        FundId,
        NewFund,
        FundOwnership,
        OwnedFund,
        Ssn,
        TaxId,
        Donation,
        DonationId,
        Donor,
        FundDonationTotal,
        SearchCondition,
        SearchConnective,
        SearchOperator,
        UserSearchField,
        SignupUserRequest,
        LoginRequest,
        UpdatePhoneRequest,
        SearchUsersRequest,
        SignupOrganizationRequest,
        UpdateOrganizationRequest,
        ProjectionRequest,
        UpdateBalanceRequest,
        InsertIndividualFundRequest,
        UpdateIndividualFundRequest,
        InsertOrganizationFundRequest,
        UpdateOrganizationFundRequest,
        InsertDonationRequest,
        UpdateDonationRequest,
    )),
    tags(
        (name = "users", description = "User accounts and search"),
        (name = "organizations", description = "Volunteer organizations"),
        (name = "funds", description = "Base donation campaigns"),
        (name = "individual-funds", description = "Funds owned by individual users"),
        (name = "organization-funds", description = "Funds owned by organizations"),
        (name = "donations", description = "Donation records and reports"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
