use canalplus_catalog::CatalogError;
use m3u_playlist::PlaylistError;
use reqwest::StatusCode;

use crate::progress::ProgressError;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("HTTP request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("request failed with HTTP {status} during {operation} for {url}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        operation: &'static str,
    },

    #[error("server did not report a content length for {url}")]
    MissingContentLength { url: String },

    #[error("response from {url} is not valid UTF-8")]
    InvalidEncoding { url: String },

    #[error("operation timed out: {url}")]
    Timeout { url: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("playlist error: {0}")]
    Playlist(#[from] PlaylistError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("progress error: {0}")]
    Progress(#[from] ProgressError),

    #[error("player `{player}` failed: {reason}")]
    Player { player: String, reason: String },
}

impl DownloadError {
    pub fn http_status(
        status: StatusCode,
        url: impl Into<String>,
        operation: &'static str,
    ) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
            operation,
        }
    }

    pub fn missing_content_length(url: impl Into<String>) -> Self {
        Self::MissingContentLength { url: url.into() }
    }

    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    pub fn player(player: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Player {
            player: player.into(),
            reason: reason.into(),
        }
    }

    /// Short stable name of the error class, logged when a video fails.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "Network",
            Self::HttpStatus { .. } => "HttpStatus",
            Self::MissingContentLength { .. } => "MissingContentLength",
            Self::InvalidEncoding { .. } => "InvalidEncoding",
            Self::Timeout { .. } => "Timeout",
            Self::Io { .. } => "Io",
            Self::Playlist(_) => "Playlist",
            Self::Catalog(e) => e.kind(),
            Self::Progress(_) => "Progress",
            Self::Player { .. } => "Player",
        }
    }
}
