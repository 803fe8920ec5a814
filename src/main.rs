use clap::Parser;
use movie_agent::cli::{self, CacheCommand, Cli, Command};
use movie_agent::infrastructure::observability::{init_tracing, shutdown_tracing};
use movie_agent::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    if matches!(cli.command, Command::Chat { verbose: false }) {
        config.logging.level = "warn".to_string();
    }

    let _guard = init_tracing(&config.logging, &config.observability.tracing);

    let result = match cli.command {
        Command::Serve => cli::serve::run(config).await,
        Command::Chat { .. } => cli::chat::run(config).await,
        Command::Cache(CacheCommand::Stats) => cli::cache::stats(config).await,
        Command::Cache(CacheCommand::Clear { pattern }) => {
            cli::cache::clear(config, pattern.as_deref()).await
        }
    };

    shutdown_tracing();
    result
}
