//! CLI argument definitions using clap derive macros.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Default HTTP connect timeout in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default total request timeout in seconds.
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Cache the upstream region catalog and serve region search.
///
/// Every option can also be supplied through the environment variable shown.
#[derive(Parser, Debug)]
#[command(name = "region-cache")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Upstream API key
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Upstream shared secret used for request signing
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// Upstream API root
    #[arg(long, env = "BASE_URL", default_value = "https://test.ean.com/2.2")]
    pub base_url: String,

    /// Customer IP forwarded to upstream in the Customer-Ip header
    #[arg(long, env = "CUSTOMER_IP")]
    pub customer_ip: Option<String>,

    /// SQLite database file for the region cache
    #[arg(long, env = "DATABASE_PATH", default_value = "regions.db")]
    pub database: PathBuf,

    /// Address for the HTTP server
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Upstream connect timeout in seconds
    #[arg(long, default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub connect_timeout: u64,

    /// Upstream request timeout in seconds
    #[arg(long, default_value_t = READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: u64,
}

impl Args {
    /// Default tracing filter derived from -q / -v.
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}
