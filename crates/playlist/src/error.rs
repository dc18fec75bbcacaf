use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("no playlist entry carries a BANDWIDTH attribute")]
    NoBandwidth,

    #[error("playlist has no media entries")]
    Empty,

    #[error("invalid playlist URI `{uri}`: {reason}")]
    InvalidUri { uri: String, reason: String },
}
