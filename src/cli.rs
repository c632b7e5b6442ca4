use crate::types::RepositoryId;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "star-count")]
#[command(about = "Look up how many stargazers a GitHub repository has")]
#[command(version)]
pub struct Cli {
    /// Repository in owner/name form
    #[arg(value_name = "REPOSITORY")]
    pub repository: RepositoryId,

    /// User-Agent header sent to the API
    #[arg(long, env = "STAR_COUNT_USER_AGENT", default_value = crate::github::DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Request timeout in seconds (0 disables it)
    #[arg(long, env = "STAR_COUNT_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "STAR_COUNT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}
