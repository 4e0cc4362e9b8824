use std::sync::Arc;

use crate::config::Config;
use crate::explorer::ExplorerClient;
use crate::extract::SelectorProfile;

#[derive(Clone)]
pub struct AppState {
    pub explorer: ExplorerClient,
    pub selectors: Arc<SelectorProfile>,
}

impl AppState {
    pub fn from_config(config: &Config) -> color_eyre::Result<Self> {
        let explorer = ExplorerClient::new(&config.explorer_base_url, config.fetch_timeout)?;
        let selectors = SelectorProfile::named(&config.selector_profile)?;

        tracing::info!(
            explorer = explorer.base_url(),
            timeout = ?config.fetch_timeout,
            profile = selectors.name(),
            "Application state ready"
        );

        Ok(Self {
            explorer,
            selectors: Arc::new(selectors),
        })
    }
}
