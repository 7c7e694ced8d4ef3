mod cli;
mod runner;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use sc_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "shrinkcast=debug,sc_av=debug,sc_core=debug".to_string()
        } else {
            "shrinkcast=info,sc_av=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let config = Config::load_or_default(cli.config.as_deref());

    match cli.command {
        Commands::Run { input, output } => runner::run(&config, &input, output).await,
        Commands::Plan { input, json } => runner::show_plan(&config, &input, json).await,
        Commands::Probe { file, json } => runner::show_probe(&config, &file, json).await,
        Commands::CheckTools => runner::check_tools(&config),
    }
}
