//! Language tags and text direction.
//!
//! Chapters inherit the manuscript language. Elements written in a
//! language with the opposite direction get an explicit `dir`, so reading
//! systems lay out Hebrew quotes in an English book (and the reverse)
//! correctly.

mod rewrite;

pub use rewrite::apply_language;

use unicode_script::{Script, UnicodeScript};

/// Primary language subtags written right to left.
const RTL_LANGUAGES: &[&str] = &[
    "ar", "arc", "ckb", "dv", "fa", "he", "iw", "ks", "ps", "sd", "syr", "ug", "ur", "yi",
];

/// Script subtags written right to left (lowercase).
const RTL_SCRIPTS: &[&str] = &["adlm", "arab", "hebr", "nkoo", "rohg", "syrc", "thaa"];

/// Base direction of a document or element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }

    /// Direction implied by a language tag.
    pub fn of_language(tag: &str) -> Self {
        if is_rtl_language(tag) {
            Direction::Rtl
        } else {
            Direction::Ltr
        }
    }
}

/// Normalize a BCP 47 language tag to its conventional casing.
///
/// `en_us` becomes `en-US`, `zh-hans-cn` becomes `zh-Hans-CN`. Subtags after
/// a singleton (`x-`, `u-`) are lowercased. Empty tags, `und`, and tags
/// with characters outside `[A-Za-z0-9]` yield `None`.
pub fn normalize_language_tag(tag: &str) -> Option<String> {
    let subtags: Vec<&str> = tag
        .trim()
        .split(['-', '_'])
        .filter(|s| !s.is_empty())
        .collect();

    let (primary, rest) = subtags.split_first()?;
    let valid = |s: &&str| s.len() <= 8 && s.bytes().all(|b| b.is_ascii_alphanumeric());
    if !subtags.iter().all(valid) {
        return None;
    }

    let primary = primary.to_ascii_lowercase();
    if primary == "und" && rest.is_empty() {
        return None;
    }

    let mut normalized = primary;
    let mut extension = normalized.len() == 1;
    for &subtag in rest {
        normalized.push('-');
        if extension {
            normalized.push_str(&subtag.to_ascii_lowercase());
            continue;
        }
        match subtag.len() {
            1 => {
                extension = true;
                normalized.push_str(&subtag.to_ascii_lowercase());
            }
            2 if subtag.bytes().all(|b| b.is_ascii_alphabetic()) => {
                normalized.push_str(&subtag.to_ascii_uppercase());
            }
            4 if subtag.bytes().all(|b| b.is_ascii_alphabetic()) => {
                normalized.push_str(&subtag[..1].to_ascii_uppercase());
                normalized.push_str(&subtag[1..].to_ascii_lowercase());
            }
            _ => normalized.push_str(&subtag.to_ascii_lowercase()),
        }
    }

    Some(normalized)
}

/// Whether text in this language is written right to left.
///
/// An explicit script subtag decides (`ks-Deva` is left to right,
/// `ku-Arab` right to left); otherwise the primary subtag does.
pub fn is_rtl_language(tag: &str) -> bool {
    let lower = tag.trim().to_ascii_lowercase();
    let mut subtags = lower.split(['-', '_']);
    let Some(primary) = subtags.next() else {
        return false;
    };

    let script = subtags
        .take_while(|s| s.len() != 1)
        .find(|s| s.len() == 4 && s.bytes().all(|b| b.is_ascii_alphabetic()));

    match script {
        Some(script) => RTL_SCRIPTS.contains(&script),
        None => RTL_LANGUAGES.contains(&primary),
    }
}

/// Dominant direction of a text by its strong (letter) characters.
///
/// Returns `None` when the text has no letters at all.
pub fn detect_direction(text: &str) -> Option<Direction> {
    let mut rtl = 0usize;
    let mut ltr = 0usize;

    for c in text.chars().filter(|c| c.is_alphabetic()) {
        match c.script() {
            Script::Arabic | Script::Hebrew | Script::Syriac | Script::Thaana => rtl += 1,
            Script::Common | Script::Inherited | Script::Unknown => {}
            _ => ltr += 1,
        }
    }

    match (rtl, ltr) {
        (0, 0) => None,
        (rtl, ltr) if rtl > ltr => Some(Direction::Rtl),
        _ => Some(Direction::Ltr),
    }
}

/// Document-level language settings applied to every chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageSettings {
    /// Normalized document language, if known.
    pub language: Option<String>,
    /// Base direction of the document.
    pub direction: Direction,
}

impl LanguageSettings {
    /// Settings for a declared language; direction follows the language.
    pub fn new(language: Option<&str>) -> Self {
        let language = language.and_then(normalize_language_tag);
        let direction = language
            .as_deref()
            .map(Direction::of_language)
            .unwrap_or_default();
        Self { language, direction }
    }

    /// Like [`LanguageSettings::new`], but with no usable language the
    /// direction is detected from `sample`.
    pub fn detect(language: Option<&str>, sample: &str) -> Self {
        let settings = Self::new(language);
        if settings.language.is_some() {
            return settings;
        }
        Self {
            direction: detect_direction(sample).unwrap_or_default(),
            ..settings
        }
    }

    pub fn is_rtl(&self) -> bool {
        self.direction == Direction::Rtl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_language_tag() {
        assert_eq!(normalize_language_tag("en_us").as_deref(), Some("en-US"));
        assert_eq!(normalize_language_tag("EN").as_deref(), Some("en"));
        assert_eq!(normalize_language_tag("zh-hans-cn").as_deref(), Some("zh-Hans-CN"));
        assert_eq!(normalize_language_tag("es-419").as_deref(), Some("es-419"));
        assert_eq!(normalize_language_tag("de-CH-1996").as_deref(), Some("de-CH-1996"));
        assert_eq!(normalize_language_tag("en-x-Pirate").as_deref(), Some("en-x-pirate"));
        assert_eq!(normalize_language_tag(" fr "), Some("fr".to_string()));
    }

    #[test]
    fn test_normalize_rejects_empty_and_invalid() {
        assert_eq!(normalize_language_tag(""), None);
        assert_eq!(normalize_language_tag("  "), None);
        assert_eq!(normalize_language_tag("und"), None);
        assert_eq!(normalize_language_tag("UND"), None);
        assert_eq!(normalize_language_tag("en us"), None);
        assert_eq!(normalize_language_tag("français"), None);
    }

    #[test]
    fn test_is_rtl_language() {
        for tag in ["ar", "he", "fa-IR", "ur", "yi", "iw", "ar_EG", "syr"] {
            assert!(is_rtl_language(tag), "{tag}");
        }
        for tag in ["en", "fr-CA", "zh-Hans", "", "ks-Deva", "ja"] {
            assert!(!is_rtl_language(tag), "{tag}");
        }
        assert!(is_rtl_language("ku-Arab"));
        assert!(is_rtl_language("ha-arab-NG"));
        assert!(!is_rtl_language("az-Latn"));
    }

    #[test]
    fn test_detect_direction() {
        assert_eq!(detect_direction("Hello, world"), Some(Direction::Ltr));
        assert_eq!(detect_direction("שלום עולם"), Some(Direction::Rtl));
        assert_eq!(detect_direction("مرحبا بالعالم (hi)"), Some(Direction::Rtl));
        assert_eq!(detect_direction("A long English sentence with one word עברית"), Some(Direction::Ltr));
        assert_eq!(detect_direction("123 — !?"), None);
        assert_eq!(detect_direction(""), None);
    }

    #[test]
    fn test_language_settings() {
        let settings = LanguageSettings::new(Some("ar_eg"));
        assert_eq!(settings.language.as_deref(), Some("ar-EG"));
        assert!(settings.is_rtl());

        let settings = LanguageSettings::new(Some("und"));
        assert_eq!(settings.language, None);
        assert_eq!(settings.direction, Direction::Ltr);

        let settings = LanguageSettings::detect(None, "שלום עולם");
        assert_eq!(settings.language, None);
        assert!(settings.is_rtl());

        let settings = LanguageSettings::detect(Some("en"), "שלום עולם");
        assert!(!settings.is_rtl());
    }
}
