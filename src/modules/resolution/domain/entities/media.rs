use serde::{Deserialize, Serialize};

use crate::shared::domain::value_objects::ContentKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaTitle {
    pub romaji: String,
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub native: Option<String>,
}

impl MediaTitle {
    pub fn romaji(romaji: impl Into<String>) -> Self {
        Self {
            romaji: romaji.into(),
            english: None,
            native: None,
        }
    }

    pub fn with_english(mut self, english: impl Into<String>) -> Self {
        self.english = Some(english.into());
        self
    }
}

/// Catalog identity of a title, owned by the metadata collaborator and
/// treated as an immutable value here
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaIdentity {
    pub id: u64,
    pub title: MediaTitle,
    pub kind: ContentKind,
}

impl MediaIdentity {
    pub fn new(id: u64, title: MediaTitle, kind: ContentKind) -> Self {
        Self { id, title, kind }
    }

    /// Title used for provider searches: romaji first, English as fallback
    pub fn search_title(&self) -> &str {
        let romaji = self.title.romaji.trim();
        if !romaji.is_empty() {
            return romaji;
        }
        self.title
            .english
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_title_prefers_romaji() {
        let media = MediaIdentity::new(
            1,
            MediaTitle::romaji("Shingeki no Kyojin").with_english("Attack on Titan"),
            ContentKind::Video,
        );
        assert_eq!(media.search_title(), "Shingeki no Kyojin");
    }

    #[test]
    fn test_search_title_falls_back_to_english() {
        let media = MediaIdentity::new(
            2,
            MediaTitle::romaji("  ").with_english("Attack on Titan"),
            ContentKind::Video,
        );
        assert_eq!(media.search_title(), "Attack on Titan");

        let untitled = MediaIdentity::new(3, MediaTitle::romaji(""), ContentKind::Reading);
        assert_eq!(untitled.search_title(), "");
    }
}
