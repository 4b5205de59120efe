//! Accessibility auditing and repair.
//!
//! Three steps run after the chapters are final:
//! - [`fix_chapter`] rewrites attributes that can be repaired mechanically
//! - [`audit`] reports what still needs an author's attention
//! - [`accessibility_metadata`] turns the result into `schema:` properties

mod audit;
mod fix;
mod metadata;

pub use audit::audit;
pub use fix::{dpub_role, fix_chapter};
pub use metadata::accessibility_metadata;

use std::fmt;

use serde::Serialize;

/// Kinds of accessibility problems found in chapter documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    /// `img` without an `alt` attribute.
    MissingAltText,
    /// Link with no text, image alt text or label.
    EmptyLink,
    /// Link text such as "click here" that says nothing out of context.
    VagueLinkText,
    /// Heading level jumps by more than one.
    HeadingSkip,
    EmptyHeading,
    /// `table` without any `th` cell.
    TableWithoutHeaders,
    /// Root element without `lang`/`xml:lang`.
    MissingLanguage,
    /// Empty or missing `<title>`.
    MissingTitle,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::MissingAltText => "missing-alt-text",
            IssueKind::EmptyLink => "empty-link",
            IssueKind::VagueLinkText => "vague-link-text",
            IssueKind::HeadingSkip => "heading-skip",
            IssueKind::EmptyHeading => "empty-heading",
            IssueKind::TableWithoutHeaders => "table-without-headers",
            IssueKind::MissingLanguage => "missing-language",
            IssueKind::MissingTitle => "missing-title",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem in one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Id of the chapter, e.g. `chapter-003`.
    pub chapter: String,
    pub kind: IssueKind,
    pub detail: String,
}

impl Issue {
    pub fn new(chapter: impl Into<String>, kind: IssueKind, detail: impl Into<String>) -> Self {
        Self {
            chapter: chapter.into(),
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.chapter, self.kind, self.detail)
    }
}

/// Result of auditing a whole book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessibilityReport {
    pub issues: Vec<Issue>,
    /// Images seen across all chapters.
    pub images: usize,
    /// Attribute fixes applied before the audit.
    pub fixes_applied: usize,
}

impl AccessibilityReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    pub fn has(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }

    /// Issues found in one chapter.
    pub fn for_chapter<'a>(&'a self, chapter: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues.iter().filter(move |i| i.chapter == chapter)
    }
}
