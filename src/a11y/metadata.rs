//! schema.org accessibility metadata for the package document.

use super::{AccessibilityReport, IssueKind};
use crate::book::{Book, MetaProperty};

pub const ACCESS_MODE: &str = "schema:accessMode";
pub const ACCESS_MODE_SUFFICIENT: &str = "schema:accessModeSufficient";
pub const ACCESSIBILITY_FEATURE: &str = "schema:accessibilityFeature";
pub const ACCESSIBILITY_HAZARD: &str = "schema:accessibilityHazard";
pub const ACCESSIBILITY_SUMMARY: &str = "schema:accessibilitySummary";

/// Describe the converted book's accessibility.
///
/// Claims are limited to what the conversion can vouch for: alternative
/// text is claimed only when every image has it, and a summary is
/// generated from the audit unless `summary` is given.
pub fn accessibility_metadata(
    report: &AccessibilityReport,
    book: &Book,
    summary: Option<&str>,
) -> Vec<MetaProperty> {
    let has_images = report.images > 0;
    let alt_complete = !report.has(IssueKind::MissingAltText);
    let mut properties = vec![MetaProperty::new(ACCESS_MODE, "textual")];

    if has_images {
        properties.push(MetaProperty::new(ACCESS_MODE, "visual"));
    }
    if !has_images || alt_complete {
        properties.push(MetaProperty::new(ACCESS_MODE_SUFFICIENT, "textual"));
    }
    if has_images {
        properties.push(MetaProperty::new(ACCESS_MODE_SUFFICIENT, "textual,visual"));
    }

    let has_headings = book.chapters.iter().any(|c| !c.headings.is_empty());
    if has_headings && !report.has(IssueKind::HeadingSkip) {
        properties.push(MetaProperty::new(ACCESSIBILITY_FEATURE, "structuralNavigation"));
    }
    if !book.toc.is_empty() {
        properties.push(MetaProperty::new(ACCESSIBILITY_FEATURE, "tableOfContents"));
    }
    if has_images && alt_complete {
        properties.push(MetaProperty::new(ACCESSIBILITY_FEATURE, "alternativeText"));
    }
    properties.push(MetaProperty::new(ACCESSIBILITY_FEATURE, "readingOrder"));
    properties.push(MetaProperty::new(ACCESSIBILITY_HAZARD, "none"));

    let summary = match summary.map(str::trim).filter(|s| !s.is_empty()) {
        Some(summary) => summary.to_string(),
        None => generated_summary(report, book),
    };
    properties.push(MetaProperty::new(ACCESSIBILITY_SUMMARY, summary));

    properties
}

fn generated_summary(report: &AccessibilityReport, book: &Book) -> String {
    let chapters = book.chapters.len();
    let structure = format!(
        "{chapters} chapter{} in reading order with a heading outline and a table of contents.",
        if chapters == 1 { "" } else { "s" }
    );
    if report.is_empty() {
        format!("{structure} No accessibility issues were detected during conversion.")
    } else {
        format!(
            "{structure} {} accessibility issue(s) were detected during conversion and may need review.",
            report.len()
        )
    }
}
