use tracing::debug;

use crate::error::PlaylistError;
use crate::parser::PlaylistEntry;

const BANDWIDTH_KEY: &str = "BANDWIDTH=";

/// The highest-bandwidth entry of a master playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestVariant<'a> {
    pub url: &'a str,
    pub bandwidth: u64,
}

/// Extract the `BANDWIDTH=<int>` value from a stream-info attribute string.
///
/// The key only matches at the start of an attribute, so
/// `AVERAGE-BANDWIDTH=` is never mistaken for it. The value runs up to the
/// next comma or the end of the string.
pub fn bandwidth(attributes: &str) -> Option<u64> {
    attributes
        .match_indices(BANDWIDTH_KEY)
        .filter(|(at, _)| {
            attributes[..*at]
                .chars()
                .next_back()
                .is_none_or(|prev| prev == ',' || prev == ':')
        })
        .find_map(|(at, _)| {
            let value = &attributes[at + BANDWIDTH_KEY.len()..];
            let value = value.split(',').next().unwrap_or(value);
            value.trim().parse().ok()
        })
}

/// Pick the entry with the largest bandwidth.
///
/// Ties go to the first entry seen. Entries without a parseable bandwidth are
/// ignored, and if none has one the playlist is rejected rather than guessing.
pub fn select_best<'a, I>(entries: I) -> Result<BestVariant<'a>, PlaylistError>
where
    I: IntoIterator<Item = PlaylistEntry<'a>>,
{
    let mut best: Option<BestVariant<'a>> = None;

    for entry in entries {
        let Some(current) = entry.attributes.and_then(bandwidth) else {
            debug!(url = entry.url, "Playlist entry has no bandwidth attribute");
            continue;
        };
        debug!("Got bitrate of {current}");

        if best.is_none_or(|b| current > b.bandwidth) {
            best = Some(BestVariant {
                url: entry.url,
                bandwidth: current,
            });
        }
    }

    best.ok_or(PlaylistError::NoBandwidth)
}
