use clap::Parser;
use utext_config::Config;

mod cli;
mod commands;
mod logging;
mod paced;

use self::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_tracing(cli.json_logs);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading profile {}", path.display());
            Config::from_json_file(path)?
        }
        None => Config::new(),
    };

    commands::run(cli.command, config).await
}
