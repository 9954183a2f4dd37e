//! Request helpers over an in-process app with every scope mounted.

use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::{test as actix_test, web, App};
use serde_json::Value;

use givelog::inbound::http::{
    donations, funds, health, individual_funds, organization_funds, organizations, users,
    HttpState,
};
use givelog::Trace;

/// Mirror of the production route table.
pub fn full_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
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
        .service(web::scope("/healthz").service(health::live).service(health::ready))
}

/// Outcome of one request against the in-process app.
pub struct Exchange {
    pub status: u16,
    pub body: Value,
}

/// Send one JSON request; the shared state carries data across calls.
pub async fn send(
    state: &HttpState,
    method: Method,
    path: &str,
    payload: Option<&Value>,
    token: Option<&str>,
) -> Exchange {
    let app = actix_test::init_service(full_app(state.clone())).await;
    let mut req = actix_test::TestRequest::default()
        .method(method)
        .uri(path);
    if let Some(payload) = payload {
        req = req.set_json(payload);
    }
    if let Some(token) = token {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    let res = app.call(req.to_request()).await.expect("request dispatch");
    let status = res.status().as_u16();
    let bytes = actix_test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    Exchange { status, body }
}

/// Run an async block on a fresh single-threaded runtime; steps in the
/// behavioural suites are synchronous.
pub fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    actix_web::rt::System::new().block_on(fut)
}
