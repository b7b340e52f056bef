//! Paybridge server binary.
//!
//! Usage: `paybridge-server [config.toml]`. The path may also be given in
//! `PAYBRIDGE_CONFIG`; without either, defaults are used.

use paybridge_server::{Config, PaybridgeServer, init_tracing, load_config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).or_else(|| std::env::var("PAYBRIDGE_CONFIG").ok());

    let config = match &path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    init_tracing(&config.server.log_level);
    tracing::info!(
        config = path.as_deref().unwrap_or("<defaults>"),
        deployment_tier = ?config.server.deployment_tier,
        "Starting Paybridge server"
    );

    let server = PaybridgeServer::build(config).await?;
    server.run().await?;

    Ok(())
}
