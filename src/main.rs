use yatube_api::config;
use yatube_api::server::{self, AppState, StoreKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();
    server::init_tracing();

    let config = config::config().clone();
    tracing::info!("Starting yatube API in {:?} mode", config.environment);

    let store = server::open_store(StoreKind::from_env(), &config).await?;
    let port = config.api.port;
    server::serve(AppState::new(store, config), port).await?;

    Ok(())
}
