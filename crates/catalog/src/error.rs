use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("request failed with HTTP {status} for {url}")]
    HttpStatus { status: StatusCode, url: String },

    #[error("request timed out for {url}")]
    Timeout { url: String },

    #[error("response from {url} is not valid UTF-8")]
    InvalidEncoding { url: String },

    #[error("malformed XML from `{action}`: {source}")]
    Xml {
        action: String,
        #[source]
        source: quick_xml::DeError,
    },

    #[error("no playable URL in media descriptor of video {video_id}")]
    NoPlayableUrl { video_id: String },

    #[error("playlist error: {0}")]
    Playlist(#[from] m3u_playlist::PlaylistError),
}

impl CatalogError {
    pub fn http_status(status: StatusCode, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Short stable name of the error class, used when reporting failures.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "Network",
            Self::HttpStatus { .. } => "HttpStatus",
            Self::Timeout { .. } => "Timeout",
            Self::InvalidEncoding { .. } => "InvalidEncoding",
            Self::Xml { .. } => "Xml",
            Self::NoPlayableUrl { .. } => "NoPlayableUrl",
            Self::Playlist(_) => "Playlist",
        }
    }
}
