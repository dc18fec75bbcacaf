use canalplus_catalog::CatalogError;
use canalplus_engine::DownloadError;
use thiserror::Error;

/// 128 + SIGINT
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("Unknown program '{0}'")]
    UnknownProgram(String),

    #[error("No videos for {0}")]
    NoVideos(String),

    #[error("interrupted")]
    Interrupted,

    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "Config",
            Self::Catalog(e) => e.kind(),
            Self::Download(e) => e.kind(),
            Self::UnknownProgram(_) => "UnknownProgram",
            Self::NoVideos(_) => "NoVideos",
            Self::Interrupted => "Interrupted",
            Self::Prompt(_) => "Prompt",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Interrupted => INTERRUPTED_EXIT_CODE,
            _ => 1,
        }
    }
}
