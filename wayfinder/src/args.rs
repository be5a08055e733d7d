use std::path::PathBuf;

use clap::Parser;

/// Wayfinder query router
#[derive(Debug, Parser)]
#[command(name = "wayfinder", about = "Hybrid AI query router for the travel marketplace")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "wayfinder.toml", env = "WAYFINDER_CONFIG")]
    pub config: PathBuf,

    /// Listen address for the query endpoint
    #[arg(long, default_value = "127.0.0.1:8080", env = "WAYFINDER_LISTEN")]
    pub listen: std::net::SocketAddr,
}
