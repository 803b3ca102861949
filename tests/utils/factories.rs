/// Test data factories
///
/// Provides convenient methods to create media and provider payloads with
/// sensible defaults
use animaid_lib::{ContentKind, MediaIdentity, MediaTitle};
use serde_json::{json, Value};

pub const KIMETSU_ID: u64 = 101922;
pub const KIMETSU_QUERY: &str = "kimetsu no yaiba";

pub fn kimetsu() -> MediaIdentity {
    MediaIdentity::new(
        KIMETSU_ID,
        MediaTitle::romaji("Kimetsu no Yaiba (2019)").with_english("Demon Slayer: Kimetsu no Yaiba"),
        ContentKind::Video,
    )
}

pub fn berserk() -> MediaIdentity {
    MediaIdentity::new(30002, MediaTitle::romaji("Berserk"), ContentKind::Reading)
}

pub fn search_results(entries: &[(&str, &str)]) -> Value {
    let results: Vec<Value> = entries
        .iter()
        .map(|(title, url)| json!({"title": title, "url": url, "img": format!("https://img.test{}.jpg", url)}))
        .collect();
    json!({ "results": results })
}

/// `count` episodes labelled "Episodio N" with ids `{slug}-N`
pub fn episodes(slug: &str, count: u32) -> Value {
    let episodes: Vec<Value> = (1..=count)
        .map(|n| json!({"number": format!("Episodio {}", n), "id": format!("{}-{}", slug, n)}))
        .collect();
    json!({ "episodes": episodes })
}

pub fn chapters(slug: &str, count: u32) -> Value {
    let chapters: Vec<Value> = (1..=count)
        .map(|n| json!({"number": format!("Capítulo {}", n), "id": format!("{}-c{}", slug, n)}))
        .collect();
    json!({ "chapters": chapters })
}

pub fn sources(tag: &str) -> Value {
    json!([
        {"name": "Okru", "url": format!("https://ok.ru/{}", tag)},
        {"name": "Streamtape", "url": format!("https://streamtape.test/{}", tag)}
    ])
}

pub fn pages(tag: &str, count: u32) -> Value {
    let pages: Vec<Value> = (1..=count)
        .rev()
        .map(|n| json!({"page": n, "img": format!("https://cdn.test/{}/{}.jpg", tag, n)}))
        .collect();
    json!(pages)
}
