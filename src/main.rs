use marathon_processor::{
    api::V5ApiClient,
    config::AppConfig,
    database::db::DbClient,
    health::{self, HealthState},
    messaging::{EventRouter, RatingEventConsumer, TopicRegistry},
    processor::RoundProcessor
};
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    env_logger::Builder::new().parse_filters(&config.log_level).init();

    log::info!("{} v{} starting", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(config).await {
        log::error!("fatal initialisation failure: {e}");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = DbClient::connect(&config.database_url).await?;
    log::info!("database connection established");

    let api = Arc::new(V5ApiClient::new(&config.v5_api_url, config.m2m.clone(), config.token_cache_time)?);
    let processor = Arc::new(RoundProcessor::new(db, Arc::clone(&api)));
    let router = EventRouter::new(processor, api, TopicRegistry::from_config(&config.kafka));
    let consumer = RatingEventConsumer::connect_with_retry(&config.kafka, router).await?;

    let health_state = Arc::new(HealthState::new());
    let health_port = config.healthcheck_port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(health_port, health_state).await {
            log::error!("health check server failed: {e}");
        }
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("interrupt received, shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    consumer.run(shutdown_rx).await;

    log::info!("shutdown complete");
    Ok(())
}
