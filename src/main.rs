// src/main.rs

use clap::Parser;
use tracing_subscriber::EnvFilter;

use kbm_service::cli::{self, Cli};
use kbm_service::config::{AppConfig, BoxError, LoggingConfig};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)?;
    init_tracing(&config.logging);

    cli::run(cli, &config).await
}

/// Логи в stderr; RUST_LOG перекрывает уровень из конфига
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.enable_json_output {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
