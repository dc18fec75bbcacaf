//! Line-oriented extended-M3U parser.
//!
//! The parser only understands the two things the downloader needs: the
//! `#EXTM3U` header and `#EXT-X-STREAM-INF` attribute lines. Every other
//! directive is skipped, and every remaining non-empty line is a media URI.
//! It has no notion of master vs. media playlists, so the caller decides when
//! an entry should itself be fetched and parsed again.

use std::str::Lines;

use url::Url;

use crate::error::PlaylistError;

/// Header every extended-M3U document starts with.
pub const EXTM3U_HEADER: &str = "#EXTM3U";

/// Prefix of the variant stream attribute line.
pub const STREAM_INF_PREFIX: &str = "#EXT-X-STREAM-INF";

const COMMENT_MARKER: char = '#';

const MEDIA_PLAYLIST_SUFFIX: &str = ".m3u8";

/// A media URI together with the attribute text of the preceding
/// `#EXT-X-STREAM-INF` line, if there was one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaylistEntry<'a> {
    pub url: &'a str,
    /// Everything after the `#EXT-X-STREAM-INF` prefix, colon included.
    pub attributes: Option<&'a str>,
}

/// Lazy iterator over the entries of a playlist, in document order.
///
/// Cloning the iterator (or calling [`parse_m3u`] again on the same text)
/// restarts the traversal from the first entry.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    lines: Option<Lines<'a>>,
    pending_attributes: Option<&'a str>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = PlaylistEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.lines.as_mut()?;
        for line in lines {
            let line = line.trim_end();
            if let Some(attributes) = line.strip_prefix(STREAM_INF_PREFIX) {
                self.pending_attributes = Some(attributes);
            } else if line.is_empty() || line.starts_with(COMMENT_MARKER) {
                continue;
            } else {
                return Some(PlaylistEntry {
                    url: line.trim_start(),
                    attributes: self.pending_attributes.take(),
                });
            }
        }
        None
    }
}

/// Parse extended-M3U text into its `(url, attributes)` entries.
///
/// A document whose first non-empty line is not the `#EXTM3U` header is not a
/// playlist, and yields no entries at all.
pub fn parse_m3u(data: &str) -> Entries<'_> {
    let mut lines = data.lines();
    let has_header = lines
        .by_ref()
        .map(|line| line.trim_start_matches('\u{feff}').trim())
        .find(|line| !line.is_empty())
        .is_some_and(|first| first == EXTM3U_HEADER);

    Entries {
        lines: has_header.then_some(lines),
        pending_attributes: None,
    }
}

/// Whether a stream URL points at an HLS media playlist rather than a
/// directly downloadable file. Query strings and fragments are ignored.
pub fn is_media_playlist_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().ends_with(MEDIA_PLAYLIST_SUFFIX),
        Err(_) => url.ends_with(MEDIA_PLAYLIST_SUFFIX),
    }
}

/// Resolve a playlist entry against the URL the playlist was fetched from.
/// Absolute entries are returned unchanged.
pub fn resolve_uri(playlist_url: &str, uri: &str) -> Result<String, PlaylistError> {
    if let Ok(absolute) = Url::parse(uri) {
        return Ok(absolute.into());
    }

    let base = Url::parse(playlist_url).map_err(|e| PlaylistError::InvalidUri {
        uri: playlist_url.to_string(),
        reason: e.to_string(),
    })?;
    base.join(uri)
        .map(Into::into)
        .map_err(|e| PlaylistError::InvalidUri {
            uri: uri.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "#EXTM3U\n\
        #EXT-X-VERSION:3\n\
        #EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=500000,RESOLUTION=480x270\n\
        http://cdn.example.com/low/index.m3u8\n\
        #EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=1500000,RESOLUTION=960x540\n\
        http://cdn.example.com/mid/index.m3u8\n\
        #EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=3000000,RESOLUTION=1280x720\n\
        http://cdn.example.com/high/index.m3u8\n";

    #[test]
    fn test_master_playlist_entries_in_order() {
        let entries: Vec<_> = parse_m3u(MASTER).collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].url, "http://cdn.example.com/low/index.m3u8");
        assert_eq!(
            entries[0].attributes,
            Some(":PROGRAM-ID=1,BANDWIDTH=500000,RESOLUTION=480x270")
        );
        assert_eq!(entries[2].url, "http://cdn.example.com/high/index.m3u8");
    }

    #[test]
    fn test_missing_header_yields_nothing() {
        let data = "#EXT-X-STREAM-INF:BANDWIDTH=1\nhttp://a/b.m3u8\n";
        assert_eq!(parse_m3u(data).count(), 0);
        assert_eq!(parse_m3u("").count(), 0);
        assert_eq!(parse_m3u("http://a/b.ts\n").count(), 0);
    }

    #[test]
    fn test_leading_blank_lines_and_crlf() {
        let data = "\r\n\r\n#EXTM3U\r\n#EXTINF:10,\r\nseg0.ts\r\n#EXTINF:10,\r\nseg1.ts\r\n";
        let urls: Vec<_> = parse_m3u(data).map(|e| e.url).collect();
        assert_eq!(urls, vec!["seg0.ts", "seg1.ts"]);
    }

    #[test]
    fn test_attributes_reset_after_each_url() {
        let data = "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=10\na.m3u8\nb.m3u8\n";
        let entries: Vec<_> = parse_m3u(data).collect();
        assert_eq!(entries[0].attributes, Some(":BANDWIDTH=10"));
        assert_eq!(entries[1].attributes, None);
    }

    #[test]
    fn test_unknown_directives_and_blank_lines_are_skipped() {
        let data = "#EXTM3U\n#EXT-X-TARGETDURATION:10\n\n#EXT-X-MEDIA-SEQUENCE:0\n#EXTINF:10,\nseg0.ts\n\n#EXT-X-ENDLIST\n";
        let entries: Vec<_> = parse_m3u(data).collect();
        assert_eq!(
            entries,
            vec![PlaylistEntry {
                url: "seg0.ts",
                attributes: None
            }]
        );
    }

    #[test]
    fn test_reparsing_restarts_from_the_first_entry() {
        let entries = parse_m3u(MASTER);
        let first_pass: Vec<_> = entries.clone().collect();
        let second_pass: Vec<_> = entries.collect();
        assert_eq!(first_pass, second_pass);
        assert_eq!(first_pass, parse_m3u(MASTER).collect::<Vec<_>>());
    }

    #[test]
    fn test_agrees_with_m3u8_rs_on_variants() {
        let parsed = m3u8_rs::parse_playlist_res(MASTER.as_bytes()).unwrap();
        let m3u8_rs::Playlist::MasterPlaylist(master) = parsed else {
            panic!("expected master playlist");
        };
        let ours: Vec<_> = parse_m3u(MASTER).map(|e| e.url.to_string()).collect();
        let theirs: Vec<_> = master.variants.into_iter().map(|v| v.uri).collect();
        assert_eq!(ours, theirs);
    }

    #[test]
    fn test_is_media_playlist_url() {
        assert!(is_media_playlist_url("http://cdn.example.com/a/index.m3u8"));
        assert!(is_media_playlist_url(
            "http://cdn.example.com/a/index.m3u8?token=abc"
        ));
        assert!(!is_media_playlist_url("http://cdn.example.com/a/video.mp4"));
        assert!(is_media_playlist_url("index.m3u8"));
    }

    #[test]
    fn test_resolve_uri() {
        assert_eq!(
            resolve_uri("http://cdn.example.com/a/index.m3u8", "seg0.ts").unwrap(),
            "http://cdn.example.com/a/seg0.ts"
        );
        assert_eq!(
            resolve_uri(
                "http://cdn.example.com/a/index.m3u8",
                "http://other.example.com/seg0.ts"
            )
            .unwrap(),
            "http://other.example.com/seg0.ts"
        );
        assert!(resolve_uri("not a url", "seg0.ts").is_err());
    }
}
