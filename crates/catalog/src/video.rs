use m3u_playlist::{parse_m3u, resolve_uri, select_best};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::client::CatalogClient;
use crate::error::CatalogError;
use crate::model::{MediaVideosXml, VideoInfoXml};

/// A catalog video.
///
/// The stream URL is resolved at most once; after that it never changes for
/// the lifetime of the value.
#[derive(Debug)]
pub struct Video {
    id: String,
    title: String,
    stream_url: OnceCell<String>,
}

impl Video {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            stream_url: OnceCell::new(),
        }
    }

    /// A video whose stream URL is already known.
    pub fn with_stream_url(
        id: impl Into<String>,
        title: impl Into<String>,
        stream_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            stream_url: OnceCell::new_with(Some(stream_url.into())),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The stream URL, if it has been resolved.
    pub fn stream_url(&self) -> Option<&str> {
        self.stream_url.get().map(String::as_str)
    }

    /// Resolve the best-quality stream URL, fetching the media descriptor on
    /// first use.
    pub async fn resolve_stream_url(&self, client: &CatalogClient) -> Result<&str, CatalogError> {
        self.stream_url
            .get_or_try_init(|| fetch_stream_url(client, &self.id))
            .await
            .map(String::as_str)
    }
}

/// Stream URLs advertised by a video's media descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaDescriptor {
    /// HLS master playlist
    pub hls: Option<String>,
    pub hd: Option<String>,
    pub medium: Option<String>,
    pub low: Option<String>,
}

impl MediaDescriptor {
    /// Best direct (non-HLS) URL: HD, then medium, then low quality.
    pub fn direct_url(&self) -> Option<&str> {
        [&self.hd, &self.medium, &self.low]
            .into_iter()
            .find_map(|url| non_blank(url.as_deref()))
    }

    pub fn hls_url(&self) -> Option<&str> {
        non_blank(self.hls.as_deref())
    }
}

impl From<MediaVideosXml> for MediaDescriptor {
    fn from(xml: MediaVideosXml) -> Self {
        Self {
            hls: xml.hls,
            hd: xml.hd,
            medium: xml.high,
            low: xml.low,
        }
    }
}

fn non_blank(url: Option<&str>) -> Option<&str> {
    url.map(str::trim).filter(|url| !url.is_empty())
}

/// Fetch the media descriptor of a video.
pub async fn fetch_media_descriptor(
    client: &CatalogClient,
    video_id: &str,
) -> Result<MediaDescriptor, CatalogError> {
    info!("Getting video metadata...");
    let info: VideoInfoXml = client.fetch_xml("getVideos", video_id).await?;
    Ok(info
        .videos
        .into_iter()
        .next()
        .map(|video| MediaDescriptor::from(video.media.videos))
        .unwrap_or_default())
}

async fn fetch_stream_url(client: &CatalogClient, video_id: &str) -> Result<String, CatalogError> {
    let descriptor = fetch_media_descriptor(client, video_id).await?;

    if let Some(master_url) = descriptor.hls_url() {
        let master = client.fetch_text(master_url).await?;
        let best = select_best(parse_m3u(&master))?;
        debug!(
            bandwidth = best.bandwidth,
            url = best.url,
            "Selected best HLS variant"
        );
        return Ok(resolve_uri(master_url, best.url)?);
    }

    descriptor
        .direct_url()
        .map(str::to_string)
        .ok_or_else(|| CatalogError::NoPlayableUrl {
            video_id: video_id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use axum::{
        Router,
        extract::{Path, State},
        routing::get,
    };
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    #[test]
    fn test_direct_url_priority() {
        let descriptor = MediaDescriptor {
            hls: None,
            hd: Some(" ".to_string()),
            medium: Some("http://cdn/medium.mp4".to_string()),
            low: Some("http://cdn/low.mp4".to_string()),
        };
        assert_eq!(descriptor.direct_url(), Some("http://cdn/medium.mp4"));
        assert_eq!(MediaDescriptor::default().direct_url(), None);
    }

    #[test]
    fn test_preresolved_video() {
        let video = Video::with_stream_url("1", "Title", "http://cdn/a.mp4");
        assert_eq!(video.stream_url(), Some("http://cdn/a.mp4"));
        assert_eq!(Video::new("2", "Other").stream_url(), None);
    }

    struct Fixture {
        base: String,
        descriptor_hits: AtomicUsize,
    }

    async fn video_info(
        State(fixture): State<Arc<Fixture>>,
        Path(id): Path<String>,
    ) -> String {
        fixture.descriptor_hits.fetch_add(1, Ordering::SeqCst);
        match id.as_str() {
            "1001" => format!(
                "<VIDEOS><VIDEO><MEDIA><VIDEOS>\
                 <HLS>{}/hls/master.m3u8</HLS>\
                 <HD>http://cdn.example.com/hd.mp4</HD>\
                 </VIDEOS></MEDIA></VIDEO></VIDEOS>",
                fixture.base
            ),
            "1002" => "<VIDEOS><VIDEO><MEDIA><VIDEOS>\
                 <BAS_DEBIT>http://cdn.example.com/low.mp4</BAS_DEBIT>\
                 </VIDEOS></MEDIA></VIDEO></VIDEOS>"
                .to_string(),
            _ => "<VIDEOS><VIDEO><MEDIA><VIDEOS></VIDEOS></MEDIA></VIDEO></VIDEOS>".to_string(),
        }
    }

    async fn master() -> &'static str {
        "#EXTM3U\n\
         #EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=400000\n\
         low/index.m3u8\n\
         #EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=1800000\n\
         high/index.m3u8\n"
    }

    async fn serve() -> (CatalogClient, Arc<Fixture>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let fixture = Arc::new(Fixture {
            base: base.clone(),
            descriptor_hits: AtomicUsize::new(0),
        });
        let app = Router::new()
            .route("/rest/getVideos/cplus/{id}", get(video_info))
            .route("/hls/master.m3u8", get(master))
            .with_state(fixture.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = CatalogClient::new(CatalogConfig {
            base_url: format!("{base}/rest"),
            ..Default::default()
        })
        .unwrap();
        (client, fixture)
    }

    #[tokio::test]
    async fn test_resolve_prefers_best_hls_variant_and_resolves_once() {
        let (client, fixture) = serve().await;
        let video = Video::new("1001", "Episode");

        let url = video.resolve_stream_url(&client).await.unwrap().to_string();
        assert_eq!(url, format!("{}/hls/high/index.m3u8", fixture.base));

        let again = video.resolve_stream_url(&client).await.unwrap();
        assert_eq!(again, url);
        assert_eq!(video.stream_url(), Some(url.as_str()));
        assert_eq!(fixture.descriptor_hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_direct_urls() {
        let (client, _fixture) = serve().await;
        let video = Video::new("1002", "Episode");
        assert_eq!(
            video.resolve_stream_url(&client).await.unwrap(),
            "http://cdn.example.com/low.mp4"
        );
    }

    #[tokio::test]
    async fn test_resolve_without_any_url_is_an_error() {
        let (client, _fixture) = serve().await;
        let video = Video::new("9999", "Episode");
        let err = video.resolve_stream_url(&client).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NoPlayableUrl { ref video_id } if video_id == "9999"
        ));
        assert_eq!(video.stream_url(), None);
    }
}
