// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Build the configuration and the GitHub client
// 3. Startup checks: repository access, then the target folder
// 4. Run the interactive shell, or the one subcommand that was asked for
// 5. Exit with proper code (0 = success, 1 = failed, 2 = unexpected error)
//
// Everything runs on a single-threaded tokio runtime: each request is
// awaited before the next command is read.
// =============================================================================

mod cli;
mod commands;
mod config;
mod github;
mod logger;
mod shell;

use cli::{Cli, Commands};
use clap::Parser;
use github::RepoClient;

use anyhow::{Context, Result};
use tokio::io::BufReader;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = shell exited normally, or the subcommand succeeded
//   Ok(1) = startup checks failed, or the subcommand failed
//   Err   = unexpected error (bad configuration, broken stdout...)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    logger::initialize(logger::level_for_verbosity(cli.verbose))?;

    let config = cli.repo.to_config().context("Invalid configuration")?;
    log::debug!("Using {:?}", config);
    let client = RepoClient::new(config).context("Failed to create HTTP client")?;

    let mut out = std::io::stdout();

    commands::print_banner(&client, &mut out)?;
    if !commands::prepare(&client, &mut out).await? {
        return Ok(1);
    }

    let succeeded = match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let input = BufReader::new(tokio::io::stdin());
            shell::run(&client, input, &mut out).await?;
            true
        }
        Commands::Upload { path } => commands::upload(&client, &path, &mut out).await?,
        Commands::Delete { filename } => commands::delete(&client, &filename, &mut out).await?,
        Commands::List => commands::list(&client, &mut out).await?,
    };

    Ok(if succeeded { 0 } else { 1 })
}
