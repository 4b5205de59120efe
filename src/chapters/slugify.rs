//! Slug generation for heading ids.
//!
//! Generates GitHub-style slugs from heading text, keeping non-Latin
//! letters so titles in any script produce readable ids.

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Slug used when heading text has no letters or digits.
pub const FALLBACK_SLUG: &str = "section";

/// Generate a slug from heading text.
///
/// Letters whose NFKD decomposition is ASCII lose their marks (Latin
/// accents, ligatures); letters of other scripts keep theirs. Everything
/// is lowercased, runs of spaces, hyphens and underscores become a single
/// hyphen, and other punctuation is dropped. A slug that would start with a digit gets an
/// `h-` prefix so it is a valid XML id.
///
/// # Examples
///
/// ```
/// use quire::chapters::slugify;
///
/// assert_eq!(slugify("Chapter One"), "chapter-one");
/// assert_eq!(slugify("Café, Crème!"), "cafe-creme");
/// assert_eq!(slugify("1984"), "h-1984");
/// assert_eq!(slugify("第一章"), "第一章");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_whitespace() || c == '-' || c == '_' {
            pending_hyphen = true;
            continue;
        }

        // Decompose so accented Latin letters fall back to their base
        // letter; leave other scripts as written.
        let decomposed: String = std::iter::once(c)
            .nfkd()
            .filter(|d| !is_combining_mark(*d))
            .collect();
        let letters: Vec<char> = if decomposed.is_ascii() {
            decomposed.chars().collect()
        } else {
            vec![c]
        };

        for letter in letters {
            if !letter.is_alphanumeric() {
                continue;
            }
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(letter.to_lowercase());
        }
    }

    if slug.is_empty() {
        return FALLBACK_SLUG.to_string();
    }
    if slug.starts_with(|c: char| c.is_ascii_digit()) {
        slug.insert_str(0, "h-");
    }
    slug
}

/// Book-wide registry of element ids.
///
/// Ids that already exist in the manuscript are reserved first so generated
/// ids never collide with them.
#[derive(Debug, Default, Clone)]
pub struct IdRegistry {
    taken: HashSet<String>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an existing id as used. Returns false if it was already taken.
    pub fn reserve(&mut self, id: &str) -> bool {
        self.taken.insert(id.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.taken.contains(id)
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }

    /// Claim a unique id derived from `base`: `base`, then `base-2`, `base-3`, ...
    pub fn claim(&mut self, base: &str) -> String {
        let base = if base.is_empty() { FALLBACK_SLUG } else { base };
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| !self.taken.contains(candidate))
            .map(|id| {
                self.taken.insert(id.clone());
                id
            })
            .unwrap_or_else(|| base.to_string())
    }
}
