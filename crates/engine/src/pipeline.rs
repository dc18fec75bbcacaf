//! Per-video download pipeline.
//!
//! A video goes through `Resolving -> Segmented | Direct -> Assembling ->
//! Remuxing -> Done`. Bytes land in a private temporary file next to the
//! destination, which is removed on every early exit and only renamed (or
//! remuxed) into place once the whole stream has been written.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use canalplus_catalog::{CatalogClient, Video};
use m3u_playlist::{PlaylistError, is_media_playlist_url, parse_m3u, resolve_uri};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use crate::config::{DownloadConfig, RemuxConfig};
use crate::error::DownloadError;
use crate::fetcher::{ChunkProgress, SegmentFetcher};
use crate::progress::{Progress, create_progress, overall_percent};
use crate::remux::{RemuxController, RemuxOutcome};
use crate::sanitize::sanitize_filename;
use crate::utils::format_byte_size;

pub const REMUXED_EXTENSION: &str = "mp4";
pub const RAW_EXTENSION: &str = "ts";

const TEMP_PREFIX: &str = ".canalplus-";

/// Where a video ends up: `<dir>/<sanitized title>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    dir: PathBuf,
    base_name: String,
}

impl DownloadTarget {
    pub fn new(dir: impl Into<PathBuf>, title: &str) -> Self {
        Self {
            dir: dir.into(),
            base_name: sanitize_filename(title),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn remuxed_path(&self) -> PathBuf {
        self.with_extension(REMUXED_EXTENSION)
    }

    pub fn raw_path(&self) -> PathBuf {
        self.with_extension(RAW_EXTENSION)
    }

    /// An already downloaded artifact, remuxed or raw. Only regular files count.
    pub async fn existing(&self) -> Result<Option<PathBuf>, DownloadError> {
        for path in [self.remuxed_path(), self.raw_path()] {
            match tokio::fs::metadata(&path).await {
                Ok(metadata) if metadata.is_file() => return Ok(Some(path)),
                Ok(_) => debug!(path = %path.display(), "Not a regular file, ignoring"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }

    fn with_extension(&self, extension: &str) -> PathBuf {
        self.dir.join(format!("{}.{extension}", self.base_name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStage {
    Resolving,
    Segmented,
    Direct,
    Assembling,
    Remuxing,
    Done,
}

impl fmt::Display for DownloadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resolving => "resolving",
            Self::Segmented => "segmented",
            Self::Direct => "direct",
            Self::Assembling => "assembling",
            Self::Remuxing => "remuxing",
            Self::Done => "done",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// An artifact for this title was already there; nothing was fetched.
    Skipped(PathBuf),
    Remuxed(PathBuf),
    /// Kept as MPEG-TS because remuxing was unavailable or failed.
    Raw(PathBuf),
}

impl DownloadOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Skipped(path) | Self::Remuxed(path) | Self::Raw(path) => path,
        }
    }
}

pub struct Downloader {
    catalog: CatalogClient,
    fetcher: SegmentFetcher,
    remux: RemuxController,
    config: DownloadConfig,
}

impl Downloader {
    /// Build a downloader sharing the catalog's HTTP client.
    pub fn new(catalog: CatalogClient, config: DownloadConfig, remux: RemuxConfig) -> Self {
        let fetcher = SegmentFetcher::new(catalog.http().clone(), &config);
        Self {
            catalog,
            fetcher,
            remux: RemuxController::new(remux),
            config,
        }
    }

    /// Download `video` into `dir`, then try to remux it.
    ///
    /// The existence check runs before the stream URL is resolved, so a
    /// video that is already on disk costs no request at all.
    pub async fn download(
        &self,
        video: &Video,
        dir: &Path,
    ) -> Result<DownloadOutcome, DownloadError> {
        let target = DownloadTarget::new(dir, video.title());
        if let Some(existing) = target.existing().await? {
            info!("File already exists, skipping download");
            debug!(path = %existing.display(), "Existing artifact");
            return Ok(DownloadOutcome::Skipped(existing));
        }

        debug!(stage = %DownloadStage::Resolving, video = video.id());
        let url = video.resolve_stream_url(&self.catalog).await?;

        tokio::fs::create_dir_all(dir).await?;
        let (file, temp_path) = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(&format!(".{RAW_EXTENSION}"))
            .tempfile_in(dir)?
            .into_parts();
        let mut sink = BufWriter::new(tokio::fs::File::from_std(file));
        let mut progress = ProgressSink(create_progress(
            self.config.progress_style,
            self.config.progress_rate,
        ));

        info!("Downloading '{}'...", video.title());
        let written = if is_media_playlist_url(url) {
            debug!(stage = %DownloadStage::Segmented, url);
            self.fetch_segments(url, &mut sink, &mut progress).await?
        } else {
            debug!(stage = %DownloadStage::Direct, url);
            self.fetch_direct(url, &mut sink, &mut progress).await?
        };

        debug!(stage = %DownloadStage::Assembling, size = written);
        sink.shutdown().await?;
        drop(sink);
        progress.complete()?;

        debug!(stage = %DownloadStage::Remuxing);
        let remuxed = target.remuxed_path();
        let outcome = match self.remux.remux(&temp_path, &remuxed).await {
            // the controller already deleted the temporary file
            RemuxOutcome::Remuxed { .. } => DownloadOutcome::Remuxed(remuxed),
            RemuxOutcome::ConverterMissing | RemuxOutcome::Failed => {
                let raw = target.raw_path();
                temp_path.persist(&raw).map_err(|e| e.error)?;
                DownloadOutcome::Raw(raw)
            }
        };

        debug!(stage = %DownloadStage::Done);
        info!("Saved '{}'", outcome.path().display());
        Ok(outcome)
    }

    async fn fetch_segments<W>(
        &self,
        playlist_url: &str,
        sink: &mut W,
        progress: &mut ProgressSink,
    ) -> Result<u64, DownloadError>
    where
        W: AsyncWrite + Unpin,
    {
        let playlist = self.fetcher.fetch_text(playlist_url).await?;
        let segments = parse_m3u(&playlist)
            .map(|entry| resolve_uri(playlist_url, entry.url))
            .collect::<Result<Vec<_>, _>>()?;
        if segments.is_empty() {
            return Err(PlaylistError::Empty.into());
        }

        let count = segments.len();
        info!(segments = count, "Fetching segments");
        let mut total = 0u64;
        for (index, segment_url) in segments.iter().enumerate() {
            debug!("Fetching segment {}/{count}", index + 1);
            let before = total;
            total += self
                .fetcher
                .fetch_into(segment_url, sink, |chunk| {
                    progress.report(
                        overall_percent(index, count, chunk.written, chunk.total),
                        || segment_annotation(index, count, chunk, before + chunk.written),
                    )
                })
                .await?;
        }
        Ok(total)
    }

    async fn fetch_direct<W>(
        &self,
        url: &str,
        sink: &mut W,
        progress: &mut ProgressSink,
    ) -> Result<u64, DownloadError>
    where
        W: AsyncWrite + Unpin,
    {
        self.fetcher
            .fetch_into(url, sink, |chunk| {
                progress.report(overall_percent(0, 1, chunk.written, chunk.total), || {
                    format!(
                        "{} / {}",
                        format_byte_size(chunk.written),
                        format_byte_size(chunk.total)
                    )
                })
            })
            .await
    }
}

/// `TS file  3/12:  187KB /  190KB, total  2.40MB`
fn segment_annotation(index: usize, count: usize, chunk: ChunkProgress, total: u64) -> String {
    let width = count.to_string().len();
    format!(
        "TS file {:>width$}/{count}: {:>6} / {:>6}, total {:>7}",
        index + 1,
        format_byte_size(chunk.written),
        format_byte_size(chunk.total),
        format_byte_size(total),
    )
}

/// The optional progress display of one download.
struct ProgressSink(Option<Box<dyn Progress>>);

impl ProgressSink {
    fn report(
        &mut self,
        percent: f64,
        annotation: impl FnOnce() -> String,
    ) -> Result<(), DownloadError> {
        if let Some(progress) = self.0.as_mut() {
            progress.update_progress(percent)?;
            progress.set_annotation(Some(annotation()));
            progress.display()?;
        }
        Ok(())
    }

    fn complete(&mut self) -> Result<(), DownloadError> {
        if let Some(progress) = self.0.as_mut() {
            progress.update_progress(100.0)?;
            progress.display()?;
            progress.finish()?;
        }
        Ok(())
    }
}
