use std::time::Duration;

use canalplus_catalog::DEFAULT_TIMEOUT;

use crate::progress::ProgressStyle;

pub const DEFAULT_CHUNK_SIZE: usize = 4096;

pub const DEFAULT_PROGRESS_RATE: u32 = 10;

pub const DEFAULT_CONVERTERS: &[&str] = &["ffmpeg", "avconv"];

/// Settings for the download pipeline.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Size of each write to the output file
    pub chunk_size: usize,

    /// Per-request timeout, also applied to every read of a response body
    pub timeout: Duration,

    pub progress_style: ProgressStyle,

    /// Maximum progress renders per second, 0 to render every update
    pub progress_rate: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout: DEFAULT_TIMEOUT,
            progress_style: ProgressStyle::default(),
            progress_rate: DEFAULT_PROGRESS_RATE,
        }
    }
}

/// Settings for the remux step.
#[derive(Debug, Clone)]
pub struct RemuxConfig {
    /// Converter binaries in order of preference, names or paths
    pub converters: Vec<String>,

    /// Let the converter print its own output
    pub verbose: bool,
}

impl Default for RemuxConfig {
    fn default() -> Self {
        Self {
            converters: DEFAULT_CONVERTERS.iter().map(|c| c.to_string()).collect(),
            verbose: false,
        }
    }
}
