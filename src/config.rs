use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result, WrapErr};

const DEFAULT_PARSE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Server settings, read once from the environment at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub parse_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            parse_timeout: Duration::from_secs(DEFAULT_PARSE_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let bind_addr = setting(&lookup, "DRAWGPX_BIND")?.unwrap_or(defaults.bind_addr);
        let parse_timeout = setting(&lookup, "DRAWGPX_PARSE_TIMEOUT_SECS")?
            .unwrap_or(defaults.parse_timeout.as_secs());
        if parse_timeout == 0 {
            return Err(eyre!("DRAWGPX_PARSE_TIMEOUT_SECS must be positive"));
        }
        let max_upload_bytes =
            setting(&lookup, "DRAWGPX_MAX_UPLOAD_BYTES")?.unwrap_or(defaults.max_upload_bytes);
        Ok(Self {
            bind_addr,
            parse_timeout: Duration::from_secs(parse_timeout),
            max_upload_bytes,
        })
    }
}

fn setting<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>())
        .transpose()
        .wrap_err_with(|| format!("invalid value for {key}"))
}
