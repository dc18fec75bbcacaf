// Extended-M3U playlist handling: line-level parsing and best variant selection
pub mod error;
pub mod parser;
pub mod quality;

pub use error::PlaylistError;
pub use parser::{Entries, PlaylistEntry, is_media_playlist_url, parse_m3u, resolve_uri};
pub use quality::{BestVariant, bandwidth, select_best};
