//! Titanic model search - command-line entry point

use clap::Parser;
use titanic_search::cli::{cmd_retrain, cmd_train, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "titanic_search=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => cmd_train(&args)?,
        Commands::Retrain(args) => cmd_retrain(&args)?,
    }

    Ok(())
}
