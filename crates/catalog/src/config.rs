use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://service.canal-plus.com/video/rest";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Applied to every request; there is no automatic retry.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(9100);

/// Settings for talking to the catalog API.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Root of the REST API, without trailing slash
    pub base_url: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Timeout for establishing a connection and for each request
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
