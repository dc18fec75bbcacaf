use std::future::Future;
use std::time::Duration;

use bytes::BytesMut;
use futures::StreamExt;
use reqwest::{Client, Response};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::config::DownloadConfig;
use crate::error::DownloadError;

/// Byte counts of the transfer in flight, reported after every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkProgress {
    pub written: u64,
    pub total: u64,
}

/// Streams remote resources, one at a time, into local sinks.
///
/// Every network await is bounded by the configured timeout so a stalled
/// connection fails the transfer instead of hanging it. There is no retry.
#[derive(Debug, Clone)]
pub struct SegmentFetcher {
    http: Client,
    chunk_size: usize,
    timeout: Duration,
}

impl SegmentFetcher {
    pub fn new(http: Client, config: &DownloadConfig) -> Self {
        Self {
            http,
            chunk_size: config.chunk_size.max(1),
            timeout: config.timeout,
        }
    }

    /// Fetch a playlist or any other small text document. The body must be
    /// valid UTF-8.
    pub async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        debug!("Fetching '{url}'...");
        let response = self.send(url, "playlist fetch").await?;
        let body = self.bounded(url, response.bytes()).await?;
        String::from_utf8(body.to_vec()).map_err(|_| DownloadError::InvalidEncoding {
            url: url.to_string(),
        })
    }

    /// Stream `url` into `sink` in chunks of the configured size.
    ///
    /// The server must announce a content length. `on_chunk` runs after every
    /// write and may abort the transfer by returning an error. Returns the
    /// number of bytes written.
    pub async fn fetch_into<W, F>(
        &self,
        url: &str,
        sink: &mut W,
        mut on_chunk: F,
    ) -> Result<u64, DownloadError>
    where
        W: AsyncWrite + Unpin,
        F: FnMut(ChunkProgress) -> Result<(), DownloadError>,
    {
        let response = self.send(url, "download").await?;
        let total = response
            .content_length()
            .ok_or_else(|| DownloadError::missing_content_length(url))?;
        debug!(url, size = total, "Downloading");

        let mut stream = response.bytes_stream();
        let mut buffer = BytesMut::with_capacity(self.chunk_size);
        let mut written = 0u64;

        while let Some(chunk) = self.bounded_next(url, stream.next()).await? {
            buffer.extend_from_slice(&chunk);
            while buffer.len() >= self.chunk_size {
                let block = buffer.split_to(self.chunk_size);
                sink.write_all(&block).await?;
                written += block.len() as u64;
                on_chunk(ChunkProgress { written, total })?;
            }
        }
        if !buffer.is_empty() {
            sink.write_all(&buffer).await?;
            written += buffer.len() as u64;
            on_chunk(ChunkProgress { written, total })?;
        }

        if written != total {
            warn!(
                url,
                written,
                expected = total,
                "Transfer size differs from announced length"
            );
        }
        Ok(written)
    }

    async fn send(&self, url: &str, operation: &'static str) -> Result<Response, DownloadError> {
        let response = self.bounded(url, self.http.get(url).send()).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(status, url, operation));
        }
        Ok(response)
    }

    async fn bounded<T>(
        &self,
        url: &str,
        fut: impl Future<Output = reqwest::Result<T>>,
    ) -> Result<T, DownloadError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| DownloadError::timeout(url))?
            .map_err(|e| map_request_error(url, e))
    }

    async fn bounded_next<T>(
        &self,
        url: &str,
        fut: impl Future<Output = Option<reqwest::Result<T>>>,
    ) -> Result<Option<T>, DownloadError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Err(_) => Err(DownloadError::timeout(url)),
            Ok(None) => Ok(None),
            Ok(Some(chunk)) => chunk.map(Some).map_err(|e| map_request_error(url, e)),
        }
    }
}

fn map_request_error(url: &str, error: reqwest::Error) -> DownloadError {
    if error.is_timeout() {
        DownloadError::timeout(url)
    } else {
        DownloadError::from(error)
    }
}
