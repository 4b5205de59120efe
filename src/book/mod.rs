//! The converted book handed to an EPUB packager.

/// Chapter content of an EPUB 3 book, ready for packaging.
#[derive(Debug, Clone, Default)]
pub struct Book {
    pub metadata: Metadata,
    /// Chapters in reading order.
    pub chapters: Vec<Chapter>,
    pub toc: Vec<TocEntry>,
}

/// Book metadata (Dublin Core + accessibility properties)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub authors: Vec<String>,
    pub language: String,
    pub identifier: String,
    /// `schema:` accessibility properties for the package document.
    pub accessibility: Vec<MetaProperty>,
}

/// A `<meta property="...">value</meta>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaProperty {
    pub property: String,
    pub value: String,
}

/// One XHTML content document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Manifest id, e.g. `chapter-001`.
    pub id: String,
    /// File name, e.g. `chapter_001.xhtml`.
    pub href: String,
    pub title: String,
    /// Headings in document order, all carrying ids.
    pub headings: Vec<HeadingRef>,
    /// The complete XHTML document.
    pub xhtml: String,
}

/// A heading that received (or already had) an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRef {
    pub level: u8,
    pub id: String,
    pub title: String,
}

/// A table of contents entry (hierarchical)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    pub href: String,
    pub children: Vec<TocEntry>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a chapter by href
    pub fn chapter(&self, href: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.href == href)
    }

    /// Chapter holding the heading with `id`.
    pub fn chapter_with_id(&self, id: &str) -> Option<&Chapter> {
        self.chapters
            .iter()
            .find(|c| c.headings.iter().any(|h| h.id == id))
    }

    /// Number of TOC entries at every level.
    pub fn toc_len(&self) -> usize {
        fn count(entries: &[TocEntry]) -> usize {
            entries.iter().map(|e| 1 + count(&e.children)).sum()
        }
        count(&self.toc)
    }
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// All values of one accessibility property.
    pub fn accessibility_values(&self, property: &str) -> Vec<&str> {
        self.accessibility
            .iter()
            .filter(|m| m.property == property)
            .map(|m| m.value.as_str())
            .collect()
    }
}

impl MetaProperty {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

impl TocEntry {
    pub fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: TocEntry) -> Self {
        self.children.push(child);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_builder() {
        let meta = Metadata::new("Title")
            .with_author("One")
            .with_author("Two")
            .with_language("fr")
            .with_identifier("urn:isbn:123");
        assert_eq!(meta.authors, vec!["One", "Two"]);
        assert_eq!(meta.language, "fr");
        assert_eq!(meta.identifier, "urn:isbn:123");
    }

    #[test]
    fn test_toc_len_counts_nested() {
        let mut book = Book::new();
        book.toc.push(
            TocEntry::new("A", "a.xhtml")
                .with_child(TocEntry::new("A.1", "a.xhtml#1").with_child(TocEntry::new("x", "a.xhtml#x"))),
        );
        book.toc.push(TocEntry::new("B", "b.xhtml"));
        assert_eq!(book.toc_len(), 4);
    }

    #[test]
    fn test_accessibility_values() {
        let mut meta = Metadata::new("T");
        meta.accessibility.push(MetaProperty::new("schema:accessMode", "textual"));
        meta.accessibility.push(MetaProperty::new("schema:accessMode", "visual"));
        meta.accessibility.push(MetaProperty::new("schema:accessibilityHazard", "none"));
        assert_eq!(meta.accessibility_values("schema:accessMode"), vec!["textual", "visual"]);
    }
}
