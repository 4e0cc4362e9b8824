use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::errors::LookupError;

/// Thin client for the explorer's token detail pages.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    client: reqwest::Client,
    base_url: String,
}

impl ExplorerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> color_eyre::Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .timeout(timeout)
            .use_rustls_tls()
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token is appended verbatim; a `/` or `?` inside it changes the
    /// path or query of the request.
    pub fn token_url(&self, token: &str) -> Result<Url, LookupError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, token))?)
    }

    /// Fetches the token page and returns its body whatever the status code.
    ///
    /// The extractor decides whether the page is usable, so a 404 or 5xx
    /// page simply fails extraction later on.
    #[tracing::instrument(skip(self), err)]
    pub async fn fetch_token_page(&self, token: &str) -> Result<Vec<u8>, LookupError> {
        let url = self.token_url(token)?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!(%status, bytes = body.len(), "Fetched token page");

        Ok(body.to_vec())
    }
}
