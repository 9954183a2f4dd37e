//! Backend entry-point: wires the REST endpoints and OpenAPI docs.

mod server;

use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use givelog::outbound::persistence::DbPool;
use server::ServerConfig;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = ServerConfig::from_env().map_err(std::io::Error::other)?;

    let pool = DbPool::new(config.pool.clone())
        .await
        .map_err(std::io::Error::other)?;

    info!(addr = %config.bind_addr, "starting server");
    let addr = config.bind_addr;
    let server = server::create_server(pool, config)?;
    info!(addr = %addr, "listening");
    server.await
}
