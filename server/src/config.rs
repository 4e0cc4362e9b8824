use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use color_eyre::eyre::{eyre, WrapErr};

use crate::extract::SelectorProfile;

pub const DEFAULT_EXPLORER_BASE_URL: &str = "https://etherscan.io/token/";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub explorer_base_url: String,
    pub fetch_timeout: Duration,
    pub selector_profile: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            explorer_base_url: DEFAULT_EXPLORER_BASE_URL.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            selector_profile: SelectorProfile::DEFAULT.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> color_eyre::Result<Self> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(port) => port
                .parse()
                .wrap_err_with(|| format!("PORT must be a port number, got {port:?}"))?,
            Err(_) => defaults.port,
        };

        let fetch_timeout = match env::var("FETCH_TIMEOUT_SECS") {
            Ok(secs) => Duration::from_secs(secs.parse().wrap_err_with(|| {
                format!("FETCH_TIMEOUT_SECS must be a whole number of seconds, got {secs:?}")
            })?),
            Err(_) => defaults.fetch_timeout,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port,
            explorer_base_url: env::var("EXPLORER_BASE_URL")
                .unwrap_or(defaults.explorer_base_url),
            fetch_timeout,
            selector_profile: env::var("SELECTOR_PROFILE").unwrap_or(defaults.selector_profile),
        })
    }

    pub fn bind_addr(&self) -> color_eyre::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| eyre!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }
}
