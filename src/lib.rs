pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod scraper;

use std::sync::Arc;

use ::scraper::Selector;
use config::Config;
use error::Result;

/// Application state shared across handlers. Built once at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: reqwest::Client,
    pub fragment_selector: Arc<Selector>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let fragment_selector = config::parse_selector(&config.fragment_selector)?;
        let client = scraper::build_client(&config)?;

        Ok(AppState {
            config: Arc::new(config),
            client,
            fragment_selector: Arc::new(fragment_selector),
        })
    }
}
