use std::collections::HashSet;
use std::fmt;

use tracing::info;
use url::form_urlencoded;

use crate::client::CatalogClient;
use crate::error::CatalogError;
use crate::model::{InitPlayerXml, MeaListXml, SearchResultsXml, VideoEntryXml};
use crate::video::Video;

/// A catalog program (a show), listing its videos newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub id: String,
    pub title: String,
}

impl Program {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }

    /// Fetch the program's videos. Every call queries the server again.
    pub async fn videos(&self, client: &CatalogClient) -> Result<VideoList, CatalogError> {
        info!("Getting video list...");
        let list: MeaListXml = client.fetch_xml("getMEAs", &self.id).await?;
        Ok(VideoList::from_entries(list.videos))
    }
}

/// A free-text search over the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    /// The query as it appears in the request path, spaces encoded as `+`.
    pub fn encoded(&self) -> String {
        form_urlencoded::byte_serialize(self.query.as_bytes()).collect()
    }

    /// Fetch the search results. Every call queries the server again.
    pub async fn videos(&self, client: &CatalogClient) -> Result<VideoList, CatalogError> {
        info!("Getting search results...");
        let results: SearchResultsXml = client.fetch_xml("search", &self.encoded()).await?;
        Ok(VideoList::from_entries(results.videos))
    }
}

/// What the user picked videos from: a program or a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Program(Program),
    Search(SearchQuery),
}

impl Selection {
    pub async fn videos(&self, client: &CatalogClient) -> Result<VideoList, CatalogError> {
        match self {
            Self::Program(program) => program.videos(client).await,
            Self::Search(search) => search.videos(client).await,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Program(program) => write!(f, "program '{}'", program.title),
            Self::Search(search) => write!(f, "search '{}'", search.query),
        }
    }
}

/// One fetched pass over a video listing, in server order.
#[derive(Debug, Default)]
pub struct VideoList {
    videos: Vec<Video>,
}

impl VideoList {
    fn from_entries(entries: Vec<VideoEntryXml>) -> Self {
        let videos = entries
            .into_iter()
            .map(|entry| {
                let title = entry.display_title();
                Video::new(entry.id, title)
            })
            .collect();
        Self { videos }
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Video> {
        self.videos.get(index)
    }

    /// The most recent video.
    pub fn first(&self) -> Option<&Video> {
        self.videos.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Video> {
        self.videos.iter()
    }
}

impl From<Vec<Video>> for VideoList {
    fn from(videos: Vec<Video>) -> Self {
        Self { videos }
    }
}

impl<'a> IntoIterator for &'a VideoList {
    type Item = &'a Video;
    type IntoIter = std::slice::Iter<'a, Video>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// All programs of the catalog, deduplicated by id in first-seen order.
#[derive(Debug, Default)]
pub struct ProgramList {
    programs: Vec<Program>,
}

impl ProgramList {
    pub async fn fetch(client: &CatalogClient) -> Result<Self, CatalogError> {
        info!("Getting program list...");
        let xml: InitPlayerXml = client.fetch_xml("initPlayer", "").await?;
        Ok(Self::from_xml(xml))
    }

    fn from_xml(xml: InitPlayerXml) -> Self {
        let mut seen = HashSet::new();
        let programs = xml
            .thematiques
            .groups
            .into_iter()
            .flat_map(|group| group.selections.programs)
            .filter(|program| seen.insert(program.id.clone()))
            .map(|program| Program::new(program.id, program.name))
            .collect();
        Self { programs }
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Program> {
        self.programs.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Program> {
        self.programs.iter()
    }

    /// Find a program by exact, case-insensitive title.
    pub fn find(&self, title: &str) -> Option<&Program> {
        let wanted = title.to_lowercase();
        self.programs
            .iter()
            .find(|program| program.title.to_lowercase() == wanted)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.find(title).is_some()
    }
}

impl From<Vec<Program>> for ProgramList {
    fn from(programs: Vec<Program>) -> Self {
        Self { programs }
    }
}
