use anyhow::Result;
use clap::Parser;
use jscloak_cli::cli::{self, Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr so stdout stays pipeable
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Presets { json } => cli::presets_command(json),
        Commands::Resolve {
            level,
            domains,
            seed,
        } => cli::resolve_command(level, domains, seed),
        Commands::Obfuscate(args) => cli::obfuscate_command(args).await,
    }
}
