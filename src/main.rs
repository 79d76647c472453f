mod config;
mod db;
mod server;
mod whatsapp;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::server::AppState;
use crate::whatsapp::WhatsAppClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,warelay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from .env / environment
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Configuration loaded successfully");
    info!("  API base: {}", config.whatsapp.api_base);
    info!("  Phone number id: {}", config.whatsapp.phone_number_id);
    info!("  Database: {}", config.database_path.display());

    // The database is connected once at startup and plays no further role;
    // a connection failure is logged but does not stop the server.
    let _db = match db::connect(&config.database_path) {
        Ok(conn) => {
            info!("Database connected");
            Some(conn)
        }
        Err(err) => {
            error!("Database connection failed: {err:#}");
            None
        }
    };

    let state = Arc::new(AppState::new(WhatsAppClient::new(config.whatsapp.clone())));
    let app = server::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Server running on port {}", config.port);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
