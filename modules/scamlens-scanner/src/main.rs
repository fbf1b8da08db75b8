use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use places_client::PlacesClient;
use scamlens_common::Config;
use scamlens_scanner::scanner::Scanner;
use vision_client::VisionClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("scamlens_scanner=info".parse()?),
        )
        .init();

    info!("ScamLens scanner starting...");

    // Load and validate config before touching the network
    let config = Config::from_env()?;
    info!(
        region = config.region.as_str(),
        query = config.query.as_str(),
        "Configuration loaded"
    );

    let timeout = Duration::from_secs(config.http_timeout_secs);
    let places = PlacesClient::new(config.places_api_key.clone(), timeout);
    let vision = VisionClient::new(config.vision_api_key.clone(), timeout);

    let scanner = Scanner::new(&places, &vision, &config);
    let stats = scanner.run().await?;
    info!("{stats}");

    Ok(())
}
