use std::net::SocketAddr;

use clap::Parser;

/// Library locations service CLI arguments
#[derive(Debug, Default, Parser)]
#[command(
    name = "locations-service",
    version,
    about = "Labels, URLs, addresses and opening hours for library location codes"
)]
pub struct Cli {
    /// Address to listen on, e.g. 0.0.0.0:3000
    #[arg(long)]
    pub bind_addr: Option<SocketAddr>,

    /// Upstream cache lifetime in seconds
    #[arg(long)]
    pub cache_ttl: Option<u64>,

    /// Fixed UTC offset used for schedules, e.g. -05:00
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<String>,
}
