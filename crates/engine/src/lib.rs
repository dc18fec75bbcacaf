//! Getting catalog videos onto disk or into a player.
//!
//! [`Downloader`] drives one video at a time: segment or direct fetch into a
//! temporary file, progress reporting, then a best-effort remux through
//! [`RemuxController`].

pub mod config;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod player;
pub mod progress;
pub mod remux;
pub mod sanitize;
pub mod utils;

pub use config::{
    DEFAULT_CHUNK_SIZE, DEFAULT_CONVERTERS, DEFAULT_PROGRESS_RATE, DownloadConfig, RemuxConfig,
};
pub use error::DownloadError;
pub use fetcher::{ChunkProgress, SegmentFetcher};
pub use pipeline::{DownloadOutcome, DownloadStage, DownloadTarget, Downloader};
pub use player::play;
pub use progress::{Progress, ProgressError, ProgressStyle, create_progress};
pub use remux::{RemuxAttempt, RemuxController, RemuxOutcome};
pub use sanitize::sanitize_filename;
