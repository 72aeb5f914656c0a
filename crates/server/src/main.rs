//! Authoritative multiplayer snake game server.

use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Snake Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = server::Config::load()?;
    info!("Loaded configuration");
    info!("  Port: {}", config.server.port);
    info!("  Board: {}x{}", config.board.width, config.board.height);
    info!("  Tick interval: {}ms", config.server.tick_interval_ms);

    // Start the game server
    server::run(config).await?;

    Ok(())
}
