//! Mechanical accessibility repairs.

use std::cell::Cell;

use log::warn;
use lol_html::{RewriteStrSettings, element, rewrite_str};

use crate::config::AccessibilityConfig;
use crate::error::Result;

/// `epub:type` values and the DPUB-ARIA role each one implies.
const DPUB_ROLES: &[(&str, &str)] = &[
    ("abstract", "doc-abstract"),
    ("acknowledgments", "doc-acknowledgments"),
    ("afterword", "doc-afterword"),
    ("appendix", "doc-appendix"),
    ("backlink", "doc-backlink"),
    ("bibliography", "doc-bibliography"),
    ("biblioref", "doc-biblioref"),
    ("chapter", "doc-chapter"),
    ("colophon", "doc-colophon"),
    ("conclusion", "doc-conclusion"),
    ("cover", "doc-cover"),
    ("credit", "doc-credit"),
    ("credits", "doc-credits"),
    ("dedication", "doc-dedication"),
    ("endnote", "doc-endnotes"),
    ("endnotes", "doc-endnotes"),
    ("epigraph", "doc-epigraph"),
    ("epilogue", "doc-epilogue"),
    ("errata", "doc-errata"),
    ("footnote", "doc-footnote"),
    ("foreword", "doc-foreword"),
    ("glossary", "doc-glossary"),
    ("glossref", "doc-glossref"),
    ("index", "doc-index"),
    ("introduction", "doc-introduction"),
    ("noteref", "doc-noteref"),
    ("notice", "doc-notice"),
    ("page-list", "doc-pagelist"),
    ("pagebreak", "doc-pagebreak"),
    ("part", "doc-part"),
    ("preface", "doc-preface"),
    ("prologue", "doc-prologue"),
    ("pullquote", "doc-pullquote"),
    ("qna", "doc-qna"),
    ("subtitle", "doc-subtitle"),
    ("tip", "doc-tip"),
    ("toc", "doc-toc"),
];

/// DPUB-ARIA role for the first recognized token of an `epub:type` value.
pub fn dpub_role(epub_type: &str) -> Option<&'static str> {
    epub_type.split_whitespace().find_map(|token| {
        let token = token.rsplit(':').next().unwrap_or(token);
        DPUB_ROLES
            .iter()
            .find(|(ty, _)| ty.eq_ignore_ascii_case(token))
            .map(|(_, role)| *role)
    })
}

/// Apply attribute fixes to one XHTML chapter.
///
/// Returns the rewritten document and the number of fixes made. With
/// `config.fix` off the document is returned unchanged.
pub fn fix_chapter(xhtml: &str, config: &AccessibilityConfig) -> Result<(String, usize)> {
    if !config.fix {
        return Ok((xhtml.to_string(), 0));
    }

    let fixes = Cell::new(0usize);
    let unlabelled_images = Cell::new(0usize);
    let fixed = || fixes.set(fixes.get() + 1);

    let output = rewrite_str(
        xhtml,
        RewriteStrSettings {
            element_content_handlers: vec![
                // Header cells in `thead` label columns; elsewhere, rows.
                element!("thead th", |el| {
                    if !el.has_attribute("scope") {
                        el.set_attribute("scope", "col")?;
                        fixed();
                    }
                    Ok(())
                }),
                element!("th", |el| {
                    if !el.has_attribute("scope") {
                        el.set_attribute("scope", "row")?;
                        fixed();
                    }
                    Ok(())
                }),
                element!("*", |el| {
                    let Some(epub_type) = el.get_attribute("epub:type") else {
                        return Ok(());
                    };
                    let tag = el.tag_name();
                    if tag == "html" || tag == "body" || el.has_attribute("role") {
                        return Ok(());
                    }
                    let role = dpub_role(&epub_type);
                    if let Some(role) = role {
                        el.set_attribute("role", role)?;
                        fixed();
                    }
                    Ok(())
                }),
                element!("img", |el| {
                    if el.has_attribute("alt") {
                        return Ok(());
                    }
                    if config.decorative_images {
                        el.set_attribute("alt", "")?;
                        if !el.has_attribute("role") {
                            el.set_attribute("role", "presentation")?;
                        }
                        fixed();
                    } else {
                        unlabelled_images.set(unlabelled_images.get() + 1);
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )?;

    if unlabelled_images.get() > 0 {
        warn!(
            "{} image(s) without alt text left as is; add alt text or enable decorative_images",
            unlabelled_images.get()
        );
    }

    Ok((output, fixes.get()))
}
