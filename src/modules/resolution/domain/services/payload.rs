//! Defensive readers for scraper proxy payloads.
//!
//! Every field is validated on its own: a missing or mistyped field drops the
//! entry (or falls back to a default) instead of failing the whole response.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::modules::resolution::domain::{
    entities::{PageImage, SearchCandidate, VideoSource},
    repositories::UnitLocator,
};
use crate::shared::domain::value_objects::ContentKind;

const UNKNOWN_SOURCE: &str = "Unknown";

/// Entries of `{ results: [...] }`, or of a bare array
pub fn search_entries(payload: &Value) -> &[Value] {
    array_or_field(payload, "results")
}

/// Title of a raw search result, empty when absent
pub fn entry_title(entry: &Value) -> String {
    string_field(entry, "title").unwrap_or_default().to_string()
}

/// Build a candidate from a raw search result; `None` without a locator
pub fn candidate_from(entry: &Value) -> Option<SearchCandidate> {
    let locator = string_field(entry, "url").or_else(|| string_field(entry, "id"))?;
    let mut candidate = SearchCandidate::new(entry_title(entry), locator);
    if let Some(thumbnail) = string_field(entry, "img").or_else(|| string_field(entry, "image")) {
        candidate = candidate.with_thumbnail(thumbnail);
    }
    Some(candidate)
}

/// `episodes[]` for video, `chapters[]` for reading
pub fn unit_listing(payload: &Value, kind: ContentKind) -> &[Value] {
    array_or_field(payload, kind.listing_key())
}

/// Label used for unit matching: `number` (string or numeric), then `title`
pub fn unit_label(entry: &Value) -> Option<String> {
    match entry.get("number") {
        Some(Value::String(label)) => return Some(label.clone()),
        Some(Value::Number(number)) => return Some(number.to_string()),
        _ => {}
    }
    string_field(entry, "title").map(str::to_string)
}

/// How to address a matched unit.
///
/// Episodes prefer a proxy-relative `url`, then `id`, then the last segment
/// of an absolute `url`. Chapters are only addressable by `id`.
pub fn unit_locator(entry: &Value, kind: ContentKind) -> Option<UnitLocator> {
    let id = string_field(entry, "id")
        .map(str::to_string)
        .or_else(|| entry.get("id").and_then(Value::as_u64).map(|id| id.to_string()));

    match kind {
        ContentKind::Reading => id.map(UnitLocator::Id),
        ContentKind::Video => {
            let url = string_field(entry, "url");
            if let Some(path) = url.filter(|url| url.starts_with('/')) {
                return Some(UnitLocator::Path(path.to_string()));
            }
            if let Some(id) = id {
                return Some(UnitLocator::Id(id));
            }
            url.and_then(|url| url.trim_end_matches('/').rsplit('/').next())
                .filter(|segment| !segment.is_empty())
                .map(|segment| UnitLocator::Id(segment.to_string()))
        }
    }
}

/// Video sources in provider order; entries without a string `url` are dropped
pub fn video_sources(payload: &Value) -> Vec<VideoSource> {
    array_or_field(payload, "sources")
        .iter()
        .filter_map(|entry| {
            let url = string_field(entry, "url")?;
            let name = string_field(entry, "name")
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(UNKNOWN_SOURCE);
            Some(VideoSource {
                name: name.to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}

/// Page images sorted by page number.
///
/// A missing `page` falls back to the 1-based position; when two entries
/// claim the same page the first one wins.
pub fn page_images(payload: &Value) -> Vec<PageImage> {
    let mut pages: BTreeMap<u32, PageImage> = BTreeMap::new();

    for (index, entry) in array_or_field(payload, "pages").iter().enumerate() {
        let Some(url) = string_field(entry, "img").or_else(|| string_field(entry, "url")) else {
            continue;
        };
        let page = entry
            .get("page")
            .and_then(|page| match page {
                Value::Number(number) => number.as_u64(),
                Value::String(text) => text.trim().parse::<u64>().ok(),
                _ => None,
            })
            .and_then(|page| u32::try_from(page).ok())
            .unwrap_or_else(|| u32::try_from(index + 1).unwrap_or(u32::MAX));

        pages.entry(page).or_insert_with(|| PageImage {
            page,
            url: url.to_string(),
            headers: string_map(entry.get("headers")),
        });
    }

    pages.into_values().collect()
}

fn array_or_field<'a>(payload: &'a Value, field: &str) -> &'a [Value] {
    match payload {
        Value::Array(entries) => entries,
        Value::Object(_) => payload
            .get(field)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    }
}

fn string_field<'a>(entry: &'a Value, field: &str) -> Option<&'a str> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|object| {
            object
                .iter()
                .filter_map(|(key, value)| value.as_str().map(|value| (key.clone(), value.to_string())))
                .collect()
        })
        .unwrap_or_default()
}
