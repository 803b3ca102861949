use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named playable stream or embed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoSource {
    pub name: String,
    pub url: String,
}

/// One page image of a chapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageImage {
    pub page: u32,
    #[serde(rename = "img")]
    pub url: String,
    /// Extra request headers some readers need (e.g. `Referer`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// Extracted content of one unit
///
/// Video sources keep provider order and are never deduplicated. Pages are
/// ascending by page number with unique numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "items", rename_all = "lowercase")]
pub enum ResolvedContent {
    Video(Vec<VideoSource>),
    Reading(Vec<PageImage>),
}

impl ResolvedContent {
    pub fn len(&self) -> usize {
        match self {
            ResolvedContent::Video(sources) => sources.len(),
            ResolvedContent::Reading(pages) => pages.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sources(&self) -> Option<&[VideoSource]> {
        match self {
            ResolvedContent::Video(sources) => Some(sources),
            ResolvedContent::Reading(_) => None,
        }
    }

    pub fn pages(&self) -> Option<&[PageImage]> {
        match self {
            ResolvedContent::Reading(pages) => Some(pages),
            ResolvedContent::Video(_) => None,
        }
    }
}
