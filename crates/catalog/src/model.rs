//! Serde mirrors of the catalog's XML documents.
//!
//! Only the elements the client reads are declared; everything else in the
//! responses is ignored. The root element name is never checked.

use serde::Deserialize;

/// `initPlayer`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct InitPlayerXml {
    #[serde(rename = "THEMATIQUES", default)]
    pub thematiques: ThematiquesXml,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ThematiquesXml {
    #[serde(rename = "THEMATIQUE", default)]
    pub groups: Vec<ThematiqueXml>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ThematiqueXml {
    #[serde(rename = "SELECTIONS", default)]
    pub selections: SelectionsXml,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SelectionsXml {
    #[serde(rename = "SELECTION", default)]
    pub programs: Vec<ProgramXml>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgramXml {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NOM", default)]
    pub name: String,
}

/// `getMEAs/<program id>`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct MeaListXml {
    #[serde(rename = "MEA", default)]
    pub videos: Vec<VideoEntryXml>,
}

/// `search/<query>`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResultsXml {
    #[serde(rename = "VIDEO", default)]
    pub videos: Vec<VideoEntryXml>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoEntryXml {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "INFOS", default)]
    pub infos: InfosXml,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InfosXml {
    #[serde(rename = "TITRAGE", default)]
    pub titrage: TitrageXml,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TitrageXml {
    #[serde(rename = "TITRE", default)]
    pub title: Option<String>,
    #[serde(rename = "SOUS_TITRE", default)]
    pub subtitle: Option<String>,
}

impl VideoEntryXml {
    /// Display title, with the subtitle appended in parentheses when present.
    pub fn display_title(&self) -> String {
        let titrage = &self.infos.titrage;
        let title = titrage.title.as_deref().unwrap_or_default().trim();
        match titrage.subtitle.as_deref().map(str::trim) {
            Some(subtitle) if !subtitle.is_empty() => format!("{title} ({subtitle})"),
            _ => title.to_string(),
        }
    }
}

/// `getVideos/<video id>`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct VideoInfoXml {
    #[serde(rename = "VIDEO", default)]
    pub videos: Vec<VideoInfoEntryXml>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VideoInfoEntryXml {
    #[serde(rename = "MEDIA", default)]
    pub media: MediaXml,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MediaXml {
    #[serde(rename = "VIDEOS", default)]
    pub videos: MediaVideosXml,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MediaVideosXml {
    #[serde(rename = "HLS", default)]
    pub hls: Option<String>,
    #[serde(rename = "HD", default)]
    pub hd: Option<String>,
    #[serde(rename = "HAUT_DEBIT", default)]
    pub high: Option<String>,
    #[serde(rename = "BAS_DEBIT", default)]
    pub low: Option<String>,
}
