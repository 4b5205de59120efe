//! Markdown manuscripts, rendered to HTML with comrak.

use comrak::{ComrakOptions, markdown_to_html};
use lol_html::{RewriteStrSettings, element, rewrite_str};

use super::Manuscript;
use crate::error::Result;
use crate::transform::find_elements;
use crate::transform::patterns::MARKDOWN_PAGEBREAK_RE;

/// Marker that the chapter splitter recognizes as a page break.
const PAGEBREAK_MARKER: &str = "<!-- pagebreak -->";

pub(super) fn parse(source: &str) -> Result<Manuscript> {
    let prepared = mark_page_breaks(source);
    let rendered = markdown_to_html(&prepared, &comrak_options());
    let body = tag_footnotes(&rendered)?;

    let title = find_elements(&body, |name| name == "h1")
        .into_iter()
        .map(|h| h.text(&body))
        .find(|text| !text.is_empty());

    Ok(Manuscript {
        title,
        language: None,
        body,
    })
}

fn comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    // Manuscripts routinely embed raw HTML (page-break divs, figures).
    options.render.unsafe_ = true;
    options
}

/// Replace `\newpage` / `\pagebreak` lines with an HTML comment block.
///
/// Lines inside fenced code blocks are left alone.
fn mark_page_breaks(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut fence: Option<(char, usize)> = None;

    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_start_matches(' ');
        let indent = line.len() - trimmed.len();

        if indent < 4
            && let Some(marker) = fence_marker(trimmed)
        {
            fence = match fence {
                None => Some(marker),
                Some((ch, len)) if marker.0 == ch && marker.1 >= len => None,
                open => open,
            };
            out.push_str(line);
            continue;
        }

        if fence.is_none() && MARKDOWN_PAGEBREAK_RE.is_match(line.trim_end_matches(['\r', '\n'])) {
            out.push('\n');
            out.push_str(PAGEBREAK_MARKER);
            out.push_str("\n\n");
            continue;
        }

        out.push_str(line);
    }

    out
}

/// Fence character and run length if `line` opens or closes a code fence.
fn fence_marker(line: &str) -> Option<(char, usize)> {
    let ch = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = line.chars().take_while(|c| *c == ch).count();
    (len >= 3).then_some((ch, len))
}

/// Give comrak's footnote markup EPUB semantics.
fn tag_footnotes(html: &str) -> Result<String> {
    if !html.contains("data-footnote") {
        return Ok(html.to_string());
    }

    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("a[data-footnote-ref]", |el| {
                    el.set_attribute("epub:type", "noteref")?;
                    Ok(())
                }),
                element!("a[data-footnote-backref]", |el| {
                    el.set_attribute("epub:type", "backlink")?;
                    Ok(())
                }),
                element!("section[data-footnotes]", |el| {
                    el.set_attribute("epub:type", "endnotes")?;
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )?;

    Ok(output)
}
