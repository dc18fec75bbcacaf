use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::error::CatalogError;

/// Shared HTTP access to the catalog API.
///
/// The underlying `reqwest::Client` carries the configured User-Agent and is
/// cheap to clone, so the download side reuses it for playlists and segments.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// URL of an API action, e.g. `<base>/getMEAs/cplus/1234`.
    pub fn action_url(&self, action: &str, parameter: &str) -> String {
        format!(
            "{}/{}/cplus/{}",
            self.config.base_url.trim_end_matches('/'),
            action,
            parameter
        )
    }

    /// Fetch a text document (XML, playlist) and decode it as UTF-8.
    pub async fn fetch_text(&self, url: &str) -> Result<String, CatalogError> {
        debug!("Fetching '{url}'...");

        let response = self
            .http
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| map_request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::http_status(status, url));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| map_request_error(url, e))?;
        String::from_utf8(body.to_vec()).map_err(|_| CatalogError::InvalidEncoding {
            url: url.to_string(),
        })
    }

    /// Fetch an API action and deserialize its XML body.
    pub async fn fetch_xml<T>(&self, action: &str, parameter: &str) -> Result<T, CatalogError>
    where
        T: DeserializeOwned,
    {
        let url = self.action_url(action, parameter);
        let text = self.fetch_text(&url).await?;
        quick_xml::de::from_str(&text).map_err(|source| CatalogError::Xml {
            action: action.to_string(),
            source,
        })
    }
}

fn map_request_error(url: &str, error: reqwest::Error) -> CatalogError {
    if error.is_timeout() {
        CatalogError::timeout(url)
    } else {
        CatalogError::from(error)
    }
}
