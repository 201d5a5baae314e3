//! Personal CRM server binary.

use std::net::SocketAddr;

use auth::JwtConfig;
use crm_server::{config::Config, create_app, create_state, init_tracing};
use crm_store::MemoryCrmStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    JwtConfig::new(config.jwt_secret.clone()).validate()?;

    init_tracing(&config.log_level);

    tracing::info!(dev_login = config.dev_login, "Starting CRM server");

    let state = create_state(config.clone(), MemoryCrmStore::new());
    let app = create_app(state);

    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
