use crate::config;
use crate::is_production;
use crate::server::{self, AppState, StoreKind};

pub async fn handle(port: Option<u16>, memory: bool) -> anyhow::Result<()> {
    if memory && is_production!() {
        return Err(anyhow::anyhow!("The in-memory store is not allowed in production"));
    }

    let config = config::config().clone();
    let kind = if memory { StoreKind::Memory } else { StoreKind::from_env() };
    let port = port.unwrap_or(config.api.port);

    tracing::info!("Starting yatube API in {:?} mode", config.environment);
    let store = server::open_store(kind, &config).await?;
    server::serve(AppState::new(store, config), port).await?;
    Ok(())
}
