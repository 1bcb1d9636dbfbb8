//! Static-file server relaying pageviews to Plausible.
//!
//! # Usage
//!
//! ```bash
//! export PLAUSIBLE_DOMAIN_NAME="example.com"
//! plausible-relay --listen 0.0.0.0:8080 --root ./public
//! ```
//!
//! Relay options are read from `PLAUSIBLE_*` variables, see
//! [`plausible_relay::config`]. A `.env` file is loaded when present.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use plausible_relay::config;
use plausible_relay::module;
use plausible_relay::server::{self, ServerConfig};

/// Serve a directory and report pageviews to Plausible.
#[derive(Parser)]
#[command(name = "plausible-relay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    listen: SocketAddr,

    /// Directory to serve
    #[arg(short, long, env = "STATIC_ROOT", default_value = "public")]
    root: PathBuf,

    /// Log format: text or json
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    log_format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_format)?;

    let relay_config = config::load_from_env().context("Failed to load relay configuration")?;
    relay_config.print_summary();

    let handler = module::provision(relay_config)?;

    server::run(
        ServerConfig {
            listen_addr: cli.listen,
            root: cli.root,
        },
        handler,
    )
    .await
}

fn init_tracing(log_format: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_format {
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init(),
        "text" => tracing_subscriber::fmt().with_env_filter(filter).init(),
        other => anyhow::bail!("LOG_FORMAT must be 'text' or 'json', got '{}'", other),
    }

    Ok(())
}
