use std::env;
use std::net::SocketAddr;

use chrono::FixedOffset;

use crate::cli::Cli;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_CACHE_TTL_SECONDS: u64 = 3600;
const DEFAULT_UTC_OFFSET: &str = "-05:00";

#[derive(Debug, Clone)]
pub struct Config {
    pub refinery_api_base_url: String,
    pub core_objects_base_url: String,
    pub url_table_url: String,
    pub rc_alerts_url: String,
    pub bind_addr: SocketAddr,
    pub cache_ttl_seconds: u64,
    pub utc_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| format!("{} is required", key));

        let refinery_api_base_url = required("REFINERY_API_BASE_URL")?;
        let core_objects_base_url = required("NYPL_CORE_OBJECTS_BASE_URL")?;
        let url_table_url = required("LOCATIONS_URL_TABLE_URL")?;
        let rc_alerts_url = required("RC_ALERTS_URL")?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|_| "BIND_ADDR must be a socket address like 0.0.0.0:3000")?;

        let cache_ttl_seconds = match lookup("CACHE_TTL_SECONDS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| "CACHE_TTL_SECONDS must be a valid number")?,
            None => DEFAULT_CACHE_TTL_SECONDS,
        };

        let utc_offset = parse_utc_offset(
            &lookup("UTC_OFFSET").unwrap_or_else(|| DEFAULT_UTC_OFFSET.to_string()),
        )?;

        Ok(Self {
            refinery_api_base_url,
            core_objects_base_url,
            url_table_url,
            rc_alerts_url,
            bind_addr,
            cache_ttl_seconds,
            utc_offset,
        })
    }

    /// Command-line flags win over the environment.
    pub fn apply_cli(mut self, cli: &Cli) -> Result<Self, String> {
        if let Some(bind_addr) = cli.bind_addr {
            self.bind_addr = bind_addr;
        }
        if let Some(ttl) = cli.cache_ttl {
            self.cache_ttl_seconds = ttl;
        }
        if let Some(offset) = cli.utc_offset.as_deref() {
            self.utc_offset = parse_utc_offset(offset)?;
        }
        Ok(self)
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_seconds as i64)
    }
}

/// Parse `+HH:MM` / `-HH:MM`.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, String> {
    raw.trim()
        .parse::<FixedOffset>()
        .map_err(|_| format!("Invalid UTC_OFFSET: {}", raw))
}
