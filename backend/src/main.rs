use anyhow::{Context, Result};
use axum::Router;
use tracing::{info, warn};

use avalanche_backend::backend::storage::{MemoryConnection, RestConnection};
use avalanche_backend::backend::{create_router, initialize_backend};
use avalanche_backend::config::AppConfig;
use avalanche_backend::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init(&config.log_level).context("Failed to initialize logging")?;

    info!("Starting server in {:?} mode", config.environment);

    let app: Router = match &config.store {
        Some(store) => {
            info!("Using remote record store at {}", store.url);
            let connection = RestConnection::new(&store.url, &store.api_key);
            create_router(initialize_backend(connection, config.export_dir.clone()))
        }
        None => {
            warn!("SUPABASE_URL/SUPABASE_ANON_KEY not set, records are kept in memory only");
            create_router(initialize_backend(MemoryConnection::new(), config.export_dir.clone()))
        }
    };

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
