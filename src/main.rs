//! Carbon Relay Server
//!
//! Main entry point: loads configuration, sets up logging, wires the shared
//! state, and starts the HTTP service.

use carbon_relay::{
    CarbonClient, CounterPersistence, CounterStore, HealthProber, RelayConfig, RelayMetrics,
    RelayServer, RelayState, ResultCache,
};
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    info!("Starting Carbon Relay Server");

    // Get config file path from command line or use default
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "carbon_relay.yaml".to_string());

    let config = if Path::new(&config_path).exists() {
        info!("Loading configuration from: {}", config_path);
        match RelayConfig::from_file(&config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("Failed to load configuration: {}", e);
                error!("Please ensure the configuration file exists and is valid");
                std::process::exit(1);
            }
        }
    } else {
        info!(
            "No configuration file at {}, using defaults",
            config_path
        );
        RelayConfig::default()
    };

    info!("Configuration:");
    info!("  - Microservice URL: {}", config.service_url);
    info!("  - Timeout: {}s", config.timeout_seconds);
    info!("  - Max attempts: {}", config.max_attempts);
    info!(
        "  - Backoff: {}ms x{}",
        config.backoff_base_ms, config.backoff_multiplier
    );
    info!("  - Counter file: {}", config.counter_file);
    info!("  - Listen address: {}", config.listen_address);

    if let Err(e) = run(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: RelayConfig) -> anyhow::Result<()> {
    let cache = Arc::new(ResultCache::new());
    let metrics = Arc::new(RelayMetrics::new());

    let client = CarbonClient::new(&config, cache.clone(), metrics.clone())
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let counters = CounterStore::new(CounterPersistence::new(&config.counter_file));
    info!(
        "Counter store initialized with {} real messages from previous session",
        counters.snapshot().real
    );

    let prober = HealthProber::new(
        &config.service_url,
        Duration::from_secs(config.timeout_seconds),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))?;

    let state = Arc::new(RelayState {
        client,
        counters,
        cache,
        metrics,
        prober,
    });

    let addr = config
        .listen_address
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen_address: {}", e))?;

    RelayServer::new(state, addr)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))
}
