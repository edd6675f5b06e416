//! Regression Prediction Server - Main Entry Point

use api::{init_logging, run_server, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;
    init_logging(&config.logging)?;

    info!("=== Prediction Server v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Model path: {}, listening on {}",
        config.model.path.display(),
        config.server.bind_address()
    );

    run_server(config).await?;

    Ok(())
}
