//! Accessibility checks over finished chapter documents.

use log::debug;

use super::{AccessibilityReport, Issue, IssueKind};
use crate::book::Chapter;
use crate::transform::{ElementSpan, Scanner, TokenKind, find_elements, headings};

/// Link texts that mean nothing out of context (compared lowercase,
/// without surrounding punctuation).
const VAGUE_LINK_TEXT: &[&str] = &[
    "click here", "here", "link", "more", "read more", "this", "this link",
];

/// Audit every chapter. Heading levels are checked across chapter
/// boundaries, since the reader sees one continuous outline.
pub fn audit(chapters: &[Chapter]) -> AccessibilityReport {
    let mut report = AccessibilityReport::new();
    let mut last_level = None;

    for chapter in chapters {
        let before = report.len();
        audit_chapter(chapter, &mut report, &mut last_level);
        debug!("{}: {} accessibility issue(s)", chapter.id, report.len() - before);
    }

    report
}

fn audit_chapter(chapter: &Chapter, report: &mut AccessibilityReport, last_level: &mut Option<u8>) {
    let html = chapter.xhtml.as_str();
    let id = chapter.id.as_str();

    let root = Scanner::new(html).find(|t| t.is_start("html"));
    let lang = root.and_then(|t| {
        t.attr("lang")
            .or_else(|| t.attr("xml:lang"))
            .filter(|lang| !lang.trim().is_empty())
    });
    if lang.is_none() {
        report.push(Issue::new(id, IssueKind::MissingLanguage, "document has no lang"));
    }

    let title = find_elements(html, |name| name == "title")
        .first()
        .map(|t| t.text(html))
        .unwrap_or_default();
    if title.is_empty() {
        report.push(Issue::new(id, IssueKind::MissingTitle, "document has no title"));
    }

    for token in Scanner::new(html) {
        if token.kind != TokenKind::StartTag || !token.is("img") {
            continue;
        }
        report.images += 1;
        if !token.has_attr("alt") {
            let src = token.attr("src").unwrap_or_default();
            report.push(Issue::new(id, IssueKind::MissingAltText, src));
        }
    }

    for link in find_elements(html, |name| name == "a") {
        let Some(href) = link.tag.attr("href") else {
            continue;
        };
        let text = link.text(html);
        if text.is_empty() {
            if !has_accessible_name(&link, html) {
                report.push(Issue::new(id, IssueKind::EmptyLink, href));
            }
            continue;
        }
        let normalized = text
            .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
            .to_lowercase();
        if VAGUE_LINK_TEXT.contains(&normalized.as_str()) {
            report.push(Issue::new(id, IssueKind::VagueLinkText, format!("{text:?} -> {href}")));
        }
    }

    for heading in headings(html) {
        let Some(level) = heading.level() else {
            continue;
        };
        let text = heading.text(html);
        if text.is_empty() && !has_accessible_name(&heading, html) {
            report.push(Issue::new(id, IssueKind::EmptyHeading, format!("h{level}")));
        }
        if let Some(previous) = *last_level
            && level > previous + 1
        {
            report.push(Issue::new(
                id,
                IssueKind::HeadingSkip,
                format!("h{previous} followed by h{level} {text:?}"),
            ));
        }
        *last_level = Some(level);
    }

    for (n, table) in find_elements(html, |name| name == "table").iter().enumerate() {
        let has_headers = Scanner::new(table.inner_html(html)).any(|t| t.is_start("th"));
        if !has_headers {
            report.push(Issue::new(id, IssueKind::TableWithoutHeaders, format!("table {}", n + 1)));
        }
    }
}

/// An element without text can still be named by `aria-label`, `title`
/// or the alt text of an image inside it.
fn has_accessible_name(element: &ElementSpan<'_>, html: &str) -> bool {
    let labelled = ["aria-label", "aria-labelledby", "title"]
        .iter()
        .any(|name| element.tag.attr(name).is_some_and(|v| !v.trim().is_empty()));

    labelled
        || Scanner::new(element.inner_html(html)).any(|t| {
            t.is_start("img") && t.attr("alt").is_some_and(|alt| !alt.trim().is_empty())
        })
}
