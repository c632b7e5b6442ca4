use anyhow::Context;
use clap::Parser;
use colored::*;
use star_count_fetcher::cli::Cli;
use star_count_fetcher::{FetcherConfig, StarCount, StarCountError, StarCountFetcher};
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cli.log_level))
        )
        .init();

    let timeout = match cli.timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let config = FetcherConfig::default()
        .with_user_agent(cli.user_agent.clone())
        .with_timeout(timeout);
    let fetcher = StarCountFetcher::new(config).context("Failed to build fetcher")?;

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    match fetcher.fetch_repository(&cli.repository, &cancel).await {
        Ok(StarCount::Found(count)) => {
            println!("⭐ {} has {} stargazers", cli.repository.to_string().bold(), count.to_string().green());
            Ok(ExitCode::SUCCESS)
        }
        Ok(StarCount::NotFound) => {
            eprintln!("{}", format!("Could not get stargazers count for {}", cli.repository).yellow());
            Ok(ExitCode::from(1))
        }
        Err(StarCountError::Cancelled) => {
            eprintln!("\n🛑 {}", "Cancelled".red());
            Ok(ExitCode::from(130))
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            Ok(ExitCode::from(2))
        }
    }
}
