use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use scraper::Selector;

use crate::error::{AppError, Result};
use crate::logging::LogFormat;

pub const DEFAULT_FRAGMENT_SELECTOR: &str =
    "#mw-content-text > div.mw-parser-output > p:nth-child(5)";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// CSS selector locating the fragment returned by `/users`.
    pub fragment_selector: String,
    /// Whole-request timeout for the scrape fetch. `None` keeps the client default.
    pub fetch_timeout: Option<Duration>,
    pub log_format: LogFormat,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
            fragment_selector: DEFAULT_FRAGMENT_SELECTOR.to_string(),
            fetch_timeout: None,
            log_format: LogFormat::Text,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let fragment_selector = lookup("SCRAPE_SELECTOR").unwrap_or(defaults.fragment_selector);
        // Reject bad selectors at startup rather than on every request.
        parse_selector(&fragment_selector)?;

        let fetch_timeout = match lookup("SCRAPE_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| {
                    AppError::ConfigError(format!("Invalid SCRAPE_TIMEOUT_SECS: {}", e))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>()?,
            None => defaults.log_format,
        };
        let log_filter = lookup("RUST_LOG").unwrap_or(defaults.log_filter);

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            fragment_selector,
            fetch_timeout,
            log_format,
            log_filter,
        })
    }
}

pub fn parse_selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw)
        .map_err(|e| AppError::ConfigError(format!("Invalid selector `{}`: {:?}", raw, e)))
}
