mod args;
mod commands;
mod import;
mod report;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use ato_api::{ClientConfig, OrchestratorClient};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::args::Cli;
use crate::report::Output;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(fallback: &str) {
    let filter = log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), fallback);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = ClientConfig::new(&cli.api_url)
        .context("invalid API base URL")?
        .with_request_timeout(Duration::from_secs(cli.timeout));
    let client = OrchestratorClient::new(config).context("failed to build HTTP client")?;
    let output = Output::new(cli.json);

    tokio::select! {
        result = commands::dispatch(&client, cli.command, output) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted; abandoning in-flight request");
            bail!("interrupted")
        }
    }
}

/// RUST_LOG wins; otherwise --log-level / ATO_LOG; `warn` when neither parses.
fn log_filter(from_env: Option<&str>, fallback: &str) -> EnvFilter {
    from_env
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(fallback).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}
