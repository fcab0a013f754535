mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<()> {
    lingua_core::config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let output = match &args.command {
        Command::Files => commands::files(&args.source).await?,
        Command::Dump { lang } => commands::dump(&args.source, lang.as_deref()).await?,
        Command::Resolve(resolve) => commands::resolve(&args.source, resolve).await?,
        Command::Watch => {
            commands::watch(&args.source).await?;
            return Ok(());
        }
    };
    print!("{output}");

    Ok(())
}
