use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse kind of content a media item carries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Episodic video (anime)
    #[serde(rename = "video")]
    Video,
    /// Paginated reading (manga)
    #[serde(rename = "reading")]
    Reading,
}

impl ContentKind {
    /// Path segment the scraping proxy uses for this kind
    pub fn route_segment(&self) -> &'static str {
        match self {
            ContentKind::Video => "anime",
            ContentKind::Reading => "manga",
        }
    }

    /// Human name of one unit of this kind
    pub fn unit_label(&self) -> &'static str {
        match self {
            ContentKind::Video => "Episode",
            ContentKind::Reading => "Chapter",
        }
    }

    /// Key of the unit listing inside an info payload
    pub fn listing_key(&self) -> &'static str {
        match self {
            ContentKind::Video => "episodes",
            ContentKind::Reading => "chapters",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentKind::Video => "video",
            ContentKind::Reading => "reading",
        };
        write!(f, "{}", name)
    }
}

/// Identifier of one scraping backend (e.g. `tioanime`, `comick`)
///
/// Names are trimmed and lower-cased on construction so that the same backend
/// always maps to the same selection-store key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProviderName(String);

impl ProviderName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a comma separated provider list, skipping blanks
    pub fn parse_list(raw: &str) -> Vec<ProviderName> {
        raw.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ProviderName::new)
            .collect()
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProviderName {
    fn from(name: &str) -> Self {
        ProviderName::new(name)
    }
}
