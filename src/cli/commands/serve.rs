use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;

use crate::config::{config, AppConfig};
use crate::database::{MemoryStore, PgStore, Store};
use crate::routes::app;
use crate::state::AppState;

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "HOST", default_value = "0.0.0.0", help = "Address to bind")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3000, help = "Port to listen on")]
    pub port: u16,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = Arc::new(config().clone());
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("SECURITY_JWT_SECRET must be set in {:?} mode", config.environment);
    }
    tracing::info!("Starting crmm-api in {:?} mode", config.environment);

    let store = open_store(&config).await?;
    let router = app(AppState::new(config, store));

    let bind_addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Postgres when a database URL is configured, process memory otherwise
async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    if config.database.url.is_some() {
        let store = PgStore::connect(&config.database)
            .await
            .context("failed to connect to the database")?;
        Ok(Arc::new(store))
    } else {
        tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on restart");
        Ok(Arc::new(MemoryStore::new()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
