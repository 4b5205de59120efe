//! Cutting a flattened manuscript body into chapter-sized sections.
//!
//! Only top-level blocks are split points, so every section is a balanced
//! fragment: a chapter never starts or ends in the middle of an element.

use std::ops::Range;

use log::debug;

use crate::config::SplitConfig;
use crate::transform::patterns::{
    BREAK_AFTER_RE, BREAK_BEFORE_RE, PAGEBREAK_CLASS_RE, PAGEBREAK_COMMENT_RE,
};
use crate::transform::{ElementStack, Scanner, Token, TokenKind, first_heading_text, text_content};

/// Elements that may wrap a chapter heading (`<section><h1>..`).
const WRAPPERS: &[&str] = &["article", "div", "header", "hgroup", "main", "section"];

/// One chapter-sized piece of the manuscript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Title from the opening heading, the first heading inside, or the
    /// front-matter title.
    pub title: Option<String>,
    pub html: String,
    /// Content that preceded the first split point.
    pub front_matter: bool,
}

/// How a top-level node relates to chapter boundaries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Boundary {
    /// Starts a new section and belongs to it.
    before: bool,
    /// Ends the current section and belongs to it.
    after: bool,
    /// Ends the current section and is dropped.
    marker: bool,
}

/// Whether a wrapper's first descendants lead straight to a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lead {
    /// Only wrappers, whitespace and comments so far.
    Open,
    Heading(u8),
    Closed,
}

/// A direct child of the body.
#[derive(Debug)]
struct TopNode {
    range: Range<usize>,
    boundary: Boundary,
    /// The node opens with a chapter heading.
    heading: bool,
}

/// Top-level element whose end tag has not been seen yet.
struct OpenElement<'a> {
    tag: Token<'a>,
    lead: Lead,
}

/// Split a body fragment into sections.
///
/// Returns one section holding everything when there is no split point.
/// Sections that contain only whitespace are dropped.
pub fn split_chapters(body: &str, config: &SplitConfig) -> Vec<Section> {
    let nodes = top_level_nodes(body, config);

    let mut sections = Vec::new();
    let mut current = SectionBuilder::new(false);

    for node in nodes {
        let html = &body[node.range.clone()];

        if node.boundary.marker {
            debug!("page-break marker at byte {}", node.range.start);
            current.flush_into(&mut sections);
            current = SectionBuilder::new(true);
            continue;
        }

        if node.boundary.before {
            debug!("split point at byte {}", node.range.start);
            current.flush_into(&mut sections);
            current = SectionBuilder::new(true);
            if node.heading {
                current.title = first_heading_text(html);
            }
        }

        current.html.push_str(html);

        if node.boundary.after {
            debug!("page break after byte {}", node.range.end);
            current.flush_into(&mut sections);
            current = SectionBuilder::new(true);
        }
    }
    current.flush_into(&mut sections);

    let split = sections.len() > 1;
    sections
        .into_iter()
        .map(|builder| builder.finish(split, &config.front_matter_title))
        .collect()
}

struct SectionBuilder {
    html: String,
    title: Option<String>,
    started_by_break: bool,
}

impl SectionBuilder {
    fn new(started_by_break: bool) -> Self {
        Self {
            html: String::new(),
            title: None,
            started_by_break,
        }
    }

    fn flush_into(&mut self, sections: &mut Vec<SectionBuilder>) {
        if self.html.trim().is_empty() {
            return;
        }
        let started_by_break = self.started_by_break;
        sections.push(std::mem::replace(self, SectionBuilder::new(started_by_break)));
    }

    fn finish(self, split: bool, front_matter_title: &str) -> Section {
        let front_matter = split && !self.started_by_break;
        let title = self
            .title
            .or_else(|| first_heading_text(&self.html))
            .or_else(|| front_matter.then(|| front_matter_title.to_string()));
        Section {
            title,
            html: self.html,
            front_matter,
        }
    }
}

/// Walk the body and classify each of its direct children.
fn top_level_nodes(body: &str, config: &SplitConfig) -> Vec<TopNode> {
    let mut nodes = Vec::new();
    let mut stack = ElementStack::new();
    let mut open: Option<OpenElement<'_>> = None;

    for token in Scanner::new(body) {
        if let Some(element) = open.as_mut() {
            element.lead = advance_lead(element.lead, &token);
            if let Some(level) = token.heading_level()
                && token.kind == TokenKind::StartTag
                && level <= config.level
                && element.lead != Lead::Heading(level)
            {
                debug!(
                    "<{}> at byte {} is nested in <{}>; not a split point",
                    token.name, token.start, element.tag.name
                );
            }

            stack.apply(&token);
            if stack.is_empty()
                && let Some(element) = open.take()
            {
                nodes.push(close_element(body, element, token.end(), config));
            }
            continue;
        }

        match token.kind {
            TokenKind::StartTag if token.is_empty_element() => {
                let html = token.raw;
                nodes.push(TopNode {
                    range: token.range(),
                    boundary: element_boundary(&token, html, config),
                    heading: false,
                });
            }
            TokenKind::StartTag => {
                let lead = if let Some(level) = token.heading_level() {
                    Lead::Heading(level)
                } else if is_wrapper(token.name) {
                    Lead::Open
                } else {
                    Lead::Closed
                };
                stack.apply(&token);
                open = Some(OpenElement { tag: token, lead });
            }
            TokenKind::Comment => {
                let marker = config.on_page_break
                    && PAGEBREAK_COMMENT_RE.is_match(token.comment_text());
                nodes.push(TopNode {
                    range: token.range(),
                    boundary: Boundary {
                        marker,
                        ..Default::default()
                    },
                    heading: false,
                });
            }
            _ => nodes.push(TopNode {
                range: token.range(),
                boundary: Boundary::default(),
                heading: false,
            }),
        }
    }

    // Unclosed element: it runs to the end of the body.
    if let Some(element) = open {
        nodes.push(close_element(body, element, body.len(), config));
    }

    nodes
}

fn close_element(body: &str, element: OpenElement<'_>, end: usize, config: &SplitConfig) -> TopNode {
    let range = element.tag.start..end;
    let html = &body[range.clone()];
    let mut boundary = element_boundary(&element.tag, html, config);

    let heading = matches!(element.lead, Lead::Heading(level) if level <= config.level);
    if heading {
        boundary.before = true;
        boundary.marker = false;
    }

    TopNode {
        range,
        boundary,
        heading,
    }
}

fn advance_lead(lead: Lead, token: &Token<'_>) -> Lead {
    if lead != Lead::Open {
        return lead;
    }
    match token.kind {
        TokenKind::StartTag => match token.heading_level() {
            Some(level) => Lead::Heading(level),
            None if is_wrapper(token.name) => Lead::Open,
            None => Lead::Closed,
        },
        TokenKind::Text if token.raw.trim().is_empty() => Lead::Open,
        TokenKind::Comment | TokenKind::Other => Lead::Open,
        _ => Lead::Closed,
    }
}

/// Page-break boundaries of a top-level element.
fn element_boundary(tag: &Token<'_>, html: &str, config: &SplitConfig) -> Boundary {
    let mut boundary = Boundary::default();
    if !config.on_page_break {
        return boundary;
    }

    // Print page-number markers stay in the flow.
    if tag.attr("epub:type").is_some_and(|ty| {
        ty.split_whitespace()
            .any(|token| token.rsplit(':').next() == Some("pagebreak"))
    }) {
        return boundary;
    }

    if tag
        .attr("class")
        .is_some_and(|class| PAGEBREAK_CLASS_RE.is_match(&class))
        && is_blank(html)
    {
        boundary.marker = true;
        return boundary;
    }

    if let Some(style) = tag.attr("style") {
        boundary.before = BREAK_BEFORE_RE.is_match(&style);
        boundary.after = BREAK_AFTER_RE.is_match(&style);
    }

    boundary
}

/// No text and no embedded media.
fn is_blank(html: &str) -> bool {
    text_content(html).is_empty()
        && !Scanner::new(html).any(|t| {
            t.kind == TokenKind::StartTag
                && ["img", "svg", "video", "audio", "object", "iframe"]
                    .iter()
                    .any(|media| t.is(media))
        })
}

fn is_wrapper(name: &str) -> bool {
    WRAPPERS.iter().any(|w| w.eq_ignore_ascii_case(name))
}
