//! Command line and environment configuration

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::constants::{DATA_DIR_NAME, DEFAULT_API_URL, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};

/// Terminal client for tracking personal expenses
#[derive(Parser, Debug, Clone)]
#[command(name = "spendly", version, about)]
pub struct Config {
    /// Base URL of the expenses API
    #[arg(long, env = "SPENDLY_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Directory for local state and logs (defaults to ~/.spendly)
    #[arg(long, env = "SPENDLY_HOME")]
    pub data_dir: Option<PathBuf>,

    /// Log filter, e.g. "info" or "spendly_tui=debug"
    #[arg(long, env = "SPENDLY_LOG", default_value = "info")]
    pub log_level: String,

    /// Wallet balance that new expenses may not exceed (overrides the profile)
    #[arg(long, env = "SPENDLY_WALLET_BALANCE")]
    pub wallet_balance: Option<f64>,

    /// Expenses requested per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Route to open on start, e.g. /expenses
    #[arg(long)]
    pub route: Option<String>,
}

impl Config {
    /// Resolved data directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DATA_DIR_NAME)
        })
    }

    /// API base URL without a trailing slash
    pub fn api_base(&self) -> String {
        self.api_url.trim_end_matches('/').to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["spendly"]);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.wallet_balance.is_none());
        assert!(config.data_dir().ends_with(DATA_DIR_NAME));
    }

    #[test]
    fn test_overrides() {
        let config = Config::parse_from([
            "spendly",
            "--api-url",
            "https://api.example.com/",
            "--wallet-balance",
            "250.5",
            "--data-dir",
            "/tmp/spendly-test",
            "--route",
            "/bar-graph-chart",
        ]);
        assert_eq!(config.api_base(), "https://api.example.com");
        assert_eq!(config.wallet_balance, Some(250.5));
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/spendly-test"));
        assert_eq!(config.route.as_deref(), Some("/bar-graph-chart"));
    }
}
