//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use givelog::ApiDoc;
use givelog::domain::{AuthService, BcryptPasswordHasher, TokenSigner};
use givelog::inbound::http::{
    donations, funds, health, individual_funds, organization_funds, organizations, users,
    HttpState,
};
use givelog::outbound::persistence::{
    DbPool, DieselDonationRepository, DieselFundRepository, DieselIndividualFundRepository,
    DieselOrganizationFundRepository, DieselOrganizationRepository, DieselUserRepository,
};
use givelog::Trace;

/// Graceful shutdown grace period for in-flight requests.
const SHUTDOWN_GRACE_SECS: u64 = 10;

/// Assemble the HTTP state over Diesel adapters backed by one shared pool.
fn build_http_state(pool: DbPool, config: &ServerConfig) -> HttpState {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let organizations = Arc::new(DieselOrganizationRepository::new(pool.clone()));
    let auth = AuthService::new(
        users.clone(),
        organizations.clone(),
        Arc::new(BcryptPasswordHasher::new()),
        TokenSigner::new(&config.jwt_secret, config.signup_ttl, config.login_ttl),
    );
    HttpState {
        users,
        organizations,
        funds: Arc::new(DieselFundRepository::new(pool.clone())),
        individual_funds: Arc::new(DieselIndividualFundRepository::new(pool.clone())),
        organization_funds: Arc::new(DieselOrganizationFundRepository::new(pool.clone())),
        donations: Arc::new(DieselDonationRepository::new(pool)),
        auth,
    }
}

fn build_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(state)
        .wrap(Trace)
        .service(
            web::scope("/users")
                .service(users::signup)
                .service(users::login)
                .service(users::check_db_connection)
                .service(users::list_users)
                .service(users::initiate)
                .service(users::search_users)
                .service(users::insert_user)
                .service(users::update_user_phone)
                .service(users::counts),
        )
        .service(
            web::scope("/org")
                .service(organizations::signup)
                .service(organizations::login)
                .service(organizations::projection)
                .service(organizations::list_organizations)
                .service(organizations::initiate)
                .service(organizations::insert)
                .service(organizations::update)
                .service(organizations::counts),
        )
        .service(
            web::scope("/fund")
                .service(funds::list_funds)
                .service(funds::funds_larger)
                .service(funds::initiate)
                .service(funds::insert)
                .service(funds::update)
                .service(funds::count)
                .service(funds::delete_fund),
        )
        .service(
            web::scope("/ind-fund")
                .service(individual_funds::list)
                .service(individual_funds::initiate)
                .service(individual_funds::insert)
                .service(individual_funds::update)
                .service(individual_funds::counts),
        )
        .service(
            web::scope("/org-fund")
                .service(organization_funds::list)
                .service(organization_funds::initiate)
                .service(organization_funds::insert)
                .service(organization_funds::update)
                .service(organization_funds::counts),
        )
        .service(
            web::scope("/donations")
                .service(donations::list)
                .service(donations::by_user)
                .service(donations::donated_all)
                .service(donations::above_average)
                .service(donations::initiate)
                .service(donations::insert)
                .service(donations::update)
                .service(donations::count),
        )
        .service(web::scope("/healthz").service(health::live).service(health::ready));

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the Actix HTTP server over an already-built pool.
///
/// In-flight requests get [`SHUTDOWN_GRACE_SECS`] to finish once a stop
/// signal arrives; the pool drops with the workers.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(pool: DbPool, config: ServerConfig) -> std::io::Result<Server> {
    let state = web::Data::new(build_http_state(pool, &config));
    let server = HttpServer::new(move || build_app(state.clone()))
        .shutdown_timeout(SHUTDOWN_GRACE_SECS)
        .bind(config.bind_addr)?
        .run();
    Ok(server)
}
