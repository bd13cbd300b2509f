use clap::Parser;
use reportbot::cli::{commands::Cli, run_cli};
use reportbot::config::AppConfig;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config);

    let level = config.as_ref().map(|c| c.log_level.as_str()).unwrap_or("info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    let config = match config {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_cli(cli.command, config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
