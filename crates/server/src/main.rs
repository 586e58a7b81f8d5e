//! Server entry point

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use krishi_config::{load_settings, Settings};
use krishi_server::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("KRISHI_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(error) => {
            // Tracing not yet initialized; use eprintln for early logging
            eprintln!("Warning: failed to load config: {error}. Using defaults.");
            Settings::default()
        }
    };

    init_tracing();

    tracing::info!("Starting Krishi advisory server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?settings.environment,
        config = env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let state = AppState::from_env(settings)?;
    let router = create_router(state);

    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,krishi_server=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
