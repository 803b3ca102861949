use regex::Regex;
use std::sync::OnceLock;

/// Transformation that can be applied to a title
///
/// Each transformation is composable and testable in isolation.
pub trait TitleTransformation: Send + Sync {
    fn transform(&self, title: &str) -> String;
    fn name(&self) -> &'static str;
}

/// Converts title to lowercase
#[derive(Debug, Clone)]
pub struct LowercaseTransform;

impl TitleTransformation for LowercaseTransform {
    fn transform(&self, title: &str) -> String {
        title.to_lowercase()
    }

    fn name(&self) -> &'static str {
        "Lowercase"
    }
}

/// Drops parenthesized annotations such as release years or season notes,
/// together with the whitespace around them
#[derive(Debug, Clone)]
pub struct StripParentheticalsTransform;

impl TitleTransformation for StripParentheticalsTransform {
    fn transform(&self, title: &str) -> String {
        static PARENTHETICAL: OnceLock<Regex> = OnceLock::new();
        let pattern = PARENTHETICAL
            .get_or_init(|| Regex::new(r"\s*\(.*?\)\s*").expect("parenthetical pattern is valid"));
        pattern.replace_all(title, " ").trim().to_string()
    }

    fn name(&self) -> &'static str {
        "StripParentheticals"
    }
}

/// Replaces glyphs common in anime titles that scrapers do not understand
#[derive(Debug, Clone)]
pub struct GlyphReplacementTransform;

impl GlyphReplacementTransform {
    const REPLACEMENTS: &'static [(char, &'static str)] = &[
        ('×', "x"), // Hunter × Hunter
        ('☆', " "), // Lucky☆Star
        ('★', " "),
        ('†', " "),
        ('²', "2"),
        ('³', "3"),
        ('・', " "), // Japanese interpunct
        ('.', " "),
    ];
}

impl TitleTransformation for GlyphReplacementTransform {
    fn transform(&self, title: &str) -> String {
        let mut result = String::with_capacity(title.len());
        for ch in title.chars() {
            match Self::REPLACEMENTS.iter().find(|(glyph, _)| *glyph == ch) {
                Some((_, replacement)) => result.push_str(replacement),
                None => result.push(ch),
            }
        }
        result
    }

    fn name(&self) -> &'static str {
        "GlyphReplacement"
    }
}

/// Slug-style transliteration: whitespace and punctuation separators become
/// `-`, diacritics fold to ASCII, `&` spells out, anything else non-word is
/// dropped
#[derive(Debug, Clone)]
pub struct TransliterateTransform;

impl TransliterateTransform {
    const FOLDS: &'static [(&'static str, char)] = &[
        ("àáâäæãåāăą", 'a'),
        ("çćč", 'c'),
        ("đď", 'd'),
        ("èéêëēėęě", 'e'),
        ("ğǵ", 'g'),
        ("ḧ", 'h'),
        ("îïíīįì", 'i'),
        ("ł", 'l'),
        ("ḿ", 'm'),
        ("ñńǹň", 'n'),
        ("ôöòóœøōõő", 'o'),
        ("ṕ", 'p'),
        ("ŕř", 'r'),
        ("ßśšşș", 's'),
        ("ťț", 't'),
        ("ûüùúūǘůűų", 'u'),
        ("ẃ", 'w'),
        ("ẍ", 'x'),
        ("ÿý", 'y'),
        ("žźż", 'z'),
        ("·/_,:;", '-'),
    ];

    fn fold(ch: char) -> Option<char> {
        Self::FOLDS
            .iter()
            .find(|(sources, _)| sources.contains(ch))
            .map(|(_, target)| *target)
    }
}

impl TitleTransformation for TransliterateTransform {
    fn transform(&self, title: &str) -> String {
        let mut result = String::with_capacity(title.len());
        let mut in_whitespace = false;

        for ch in title.chars() {
            if ch.is_whitespace() {
                if !in_whitespace {
                    result.push('-');
                }
                in_whitespace = true;
                continue;
            }
            in_whitespace = false;

            let ch = Self::fold(ch).unwrap_or(ch);
            if ch == '&' {
                result.push_str("-and-");
            } else if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                result.push(ch);
            }
        }

        result
    }

    fn name(&self) -> &'static str {
        "Transliterate"
    }
}

/// Collapses runs of `-` and trims them from both ends
#[derive(Debug, Clone)]
pub struct CollapseSeparatorsTransform;

impl TitleTransformation for CollapseSeparatorsTransform {
    fn transform(&self, title: &str) -> String {
        title
            .split('-')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<&str>>()
            .join("-")
    }

    fn name(&self) -> &'static str {
        "CollapseSeparators"
    }
}

/// Providers tokenize on whitespace, so word separators end up as spaces
#[derive(Debug, Clone)]
pub struct SeparatorsToSpacesTransform;

impl TitleTransformation for SeparatorsToSpacesTransform {
    fn transform(&self, title: &str) -> String {
        title.replace('-', " ")
    }

    fn name(&self) -> &'static str {
        "SeparatorsToSpaces"
    }
}

/// Title sanitizer that applies a pipeline of transformations
///
/// Uses the builder pattern for composability and testability.
pub struct TitleSanitizer {
    transformations: Vec<Box<dyn TitleTransformation>>,
}

impl TitleSanitizer {
    /// Create a new empty sanitizer
    pub fn new() -> Self {
        Self {
            transformations: Vec::new(),
        }
    }

    /// Pipeline used for every provider search query
    pub fn provider_query() -> Self {
        Self::new()
            .with(LowercaseTransform)
            .with(StripParentheticalsTransform)
            .with(GlyphReplacementTransform)
            .with(TransliterateTransform)
            .with(CollapseSeparatorsTransform)
            .with(SeparatorsToSpacesTransform)
    }

    pub fn with<T: TitleTransformation + 'static>(mut self, transformation: T) -> Self {
        self.transformations.push(Box::new(transformation));
        self
    }

    /// Apply all transformations to the title
    pub fn sanitize(&self, title: &str) -> String {
        let mut result = title.to_string();

        for transformation in &self.transformations {
            result = transformation.transform(&result);
            log::trace!("After {}: '{}'", transformation.name(), result);
        }

        result
    }

    /// Get the number of transformations in the pipeline
    pub fn transformation_count(&self) -> usize {
        self.transformations.len()
    }
}

impl Default for TitleSanitizer {
    fn default() -> Self {
        Self::provider_query()
    }
}

/// Normalize a display title into a provider search query.
///
/// Deterministic and infallible; a title made only of unsupported script
/// sanitizes to an empty string.
pub fn sanitize(raw_title: &str) -> String {
    static SANITIZER: OnceLock<TitleSanitizer> = OnceLock::new();
    SANITIZER
        .get_or_init(TitleSanitizer::provider_query)
        .sanitize(raw_title)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Individual transformation tests

    #[test]
    fn test_strip_parentheticals() {
        let transform = StripParentheticalsTransform;
        assert_eq!(transform.transform("hunter x hunter (2011)"), "hunter x hunter");
        assert_eq!(
            transform.transform("fruits basket (2019) (tv)"),
            "fruits basket"
        );
        assert_eq!(transform.transform("a (b) c"), "a c");
    }

    #[test]
    fn test_glyph_replacement() {
        let transform = GlyphReplacementTransform;
        assert_eq!(transform.transform("hunter × hunter"), "hunter x hunter");
        assert_eq!(transform.transform("lucky☆star"), "lucky star");
        assert_eq!(transform.transform("dr. stone"), "dr  stone");
        assert_eq!(transform.transform("x²"), "x2");
    }

    #[test]
    fn test_transliterate() {
        let transform = TransliterateTransform;
        assert_eq!(transform.transform("pokémon"), "pokemon");
        assert_eq!(transform.transform("re:zero"), "re-zero");
        assert_eq!(transform.transform("tom & jerry"), "tom--and--jerry");
        assert_eq!(transform.transform("jojo's  bizarre"), "jojos-bizarre");
        assert_eq!(transform.transform("進撃の巨人"), "");
    }

    #[test]
    fn test_collapse_separators() {
        let transform = CollapseSeparatorsTransform;
        assert_eq!(transform.transform("--shingeki--no---kyojin-"), "shingeki-no-kyojin");
        assert_eq!(transform.transform("---"), "");
    }

    // Pipeline tests

    #[test]
    fn test_empty_pipeline_is_identity() {
        let sanitizer = TitleSanitizer::new();
        assert_eq!(sanitizer.sanitize("Naruto (TV)"), "Naruto (TV)");
        assert_eq!(sanitizer.transformation_count(), 0);
    }

    #[test]
    fn test_provider_query_pipeline() {
        assert_eq!(TitleSanitizer::provider_query().transformation_count(), 6);
    }

    // Real-world anime title tests

    #[test]
    fn test_hunter_x_hunter() {
        assert_eq!(sanitize("Hunter × Hunter (2011)"), "hunter x hunter");
        assert_eq!(sanitize("Hunter × Hunter (2011)"), sanitize("Hunter × Hunter (2011)"));
    }

    #[test]
    fn test_real_world_titles() {
        assert_eq!(sanitize("Kimetsu no Yaiba (2019)"), "kimetsu no yaiba");
        assert_eq!(sanitize("Lucky☆Star"), "lucky star");
        assert_eq!(sanitize("Re:Zero kara Hajimeru Isekai Seikatsu"), "re zero kara hajimeru isekai seikatsu");
        assert_eq!(sanitize("Shingeki no Kyojin: The Final Season"), "shingeki no kyojin the final season");
        assert_eq!(sanitize("Fate/Zero"), "fate zero");
        assert_eq!(sanitize("Dr. STONE"), "dr stone");
        assert_eq!(sanitize("Kaguya-sama wa Kokurasetai"), "kaguya sama wa kokurasetai");
        assert_eq!(sanitize("Pokémon"), "pokemon");
        assert_eq!(sanitize("Tom & Jerry"), "tom and jerry");
        assert_eq!(sanitize("Yahari Ore no Seishun Love Comedy wa Machigatteiru. Zoku"), "yahari ore no seishun love comedy wa machigatteiru zoku");
    }

    // Edge case tests

    #[test]
    fn test_sanitize_to_empty_is_valid() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("進撃の巨人"), "");
        assert_eq!(sanitize("(2019)"), "");
        assert_eq!(sanitize("   "), "");
    }

    #[test]
    fn test_no_hyphens_or_double_spaces_survive() {
        let result = sanitize("  Mob Psycho 100 -- II  ");
        assert_eq!(result, "mob psycho 100 ii");
        assert!(!result.contains('-'));
        assert!(!result.contains("  "));
    }

    // Property tests

    #[test]
    fn test_sanitize_is_idempotent() {
        let titles = [
            "Hunter × Hunter (2011)",
            "Kimetsu no Yaiba (2019)",
            "Lucky☆Star",
            "Re:Zero",
            "Tom & Jerry",
            "Sword Art Online²",
            "Spy×Family",
            "snake_case_title",
            "Ōkami Kakushi",
            "進撃の巨人",
        ];

        for title in titles {
            let once = sanitize(title);
            let twice = sanitize(&once);
            assert_eq!(once, twice, "Sanitize not idempotent for '{}'", title);
        }
    }
}
