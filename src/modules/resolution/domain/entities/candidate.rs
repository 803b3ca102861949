use serde::{Deserialize, Serialize};

/// One hit from a provider's fuzzy title search
///
/// Serialized with the upstream field names (`title`, `url`, `img`) so stored
/// selections keep the shape the proxy returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawCandidate")]
pub struct SearchCandidate {
    pub title: String,
    /// Provider-relative path or opaque id used to fetch the candidate's info
    #[serde(rename = "url")]
    pub locator: String,
    #[serde(rename = "img", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Upstream result object: `url` wins over `id`, `img` over `image`, and
/// unknown fields are ignored
#[derive(Deserialize)]
struct RawCandidate {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    img: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

impl TryFrom<RawCandidate> for SearchCandidate {
    type Error = String;

    fn try_from(raw: RawCandidate) -> Result<Self, Self::Error> {
        let locator = raw
            .url
            .or(raw.id)
            .ok_or_else(|| "search result has neither `url` nor `id`".to_string())?;

        Ok(Self {
            title: raw.title.unwrap_or_default(),
            locator,
            thumbnail: raw.img.or(raw.image),
        })
    }
}

impl SearchCandidate {
    pub fn new(title: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            locator: locator.into(),
            thumbnail: None,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}
