mod cli;
mod config;
mod enrich;
mod error;
mod export;
mod llm;
mod pdf;
mod pipeline;
mod record;
mod references;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing - only show warnings by default, use RUST_LOG=info for more detail
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            cli::commands::init::run(force).await?;
        }
        Commands::Auth {
            provider,
            key,
            list,
        } => {
            cli::commands::auth::run(provider, key, list).await?;
        }
        Commands::Extract {
            input,
            output,
            format,
            provider,
            model,
            save_full_text,
            no_enrich,
        } => {
            cli::commands::extract::run(
                input,
                output,
                format,
                provider,
                model,
                save_full_text,
                no_enrich,
            )
            .await?;
        }
    }

    Ok(())
}
