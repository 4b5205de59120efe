//! HTML parsing and text helpers.
//!
//! Provides utilities for:
//! - Parsing HTML fragments with html5ever
//! - Escaping and decoding character references
//! - Extracting plain text from markup
//! - Locating elements (and their content) by name

use std::borrow::Cow;
use std::ops::Range;

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, ns, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::scan::{Scanner, Token, TokenKind};

/// Parse an HTML fragment into a DOM tree.
///
/// The fragment is wrapped in a minimal document, so the tree builder
/// applies body rules: implied end tags, misnested formatting, foreign
/// (SVG, MathML) content and every HTML named character reference.
pub fn parse_fragment(html: &str) -> RcDom {
    let wrapped = format!("<!DOCTYPE html><html><head></head><body>{html}</body></html>");
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };

    parse_document(RcDom::default(), opts)
        .from_utf8()
        .one(wrapped.as_bytes())
}

/// Find the first HTML element named `name`, depth first.
pub fn find_first_element(handle: &Handle, name: &str) -> Option<Handle> {
    if let NodeData::Element { name: qual, .. } = &handle.data
        && qual.ns == ns!(html)
        && &*qual.local == name
    {
        return Some(handle.clone());
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_first_element(child, name))
}

/// Decode character references (`&amp;`, `&atilde;`, `&#233;`, `&#xE9;`).
///
/// Unknown references are left as written.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(text)
}

/// Characters allowed in an XML 1.0 document.
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Escape XML special characters.
///
/// Characters XML cannot carry at all (NUL, C0 controls) become U+FFFD.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_xml_char(c) => out.push(c),
            _ => out.push(char::REPLACEMENT_CHARACTER),
        }
    }
    out
}

/// Plain text of a markup fragment: tags stripped, entities decoded,
/// whitespace collapsed and trimmed.
pub fn text_content(html: &str) -> String {
    let mut text = String::new();
    let mut skip: Option<&str> = None;

    for token in Scanner::new(html) {
        match token.kind {
            TokenKind::StartTag if token.is("script") || token.is("style") => {
                if !token.self_closing {
                    skip = Some(token.name);
                }
            }
            TokenKind::EndTag if skip.is_some_and(|name| token.is(name)) => skip = None,
            TokenKind::Text if skip.is_none() => text.push_str(&decode_entities(token.raw)),
            // Block boundaries separate words.
            TokenKind::StartTag | TokenKind::EndTag if is_block(token.name) => text.push(' '),
            _ => {}
        }
    }

    collapse_whitespace(&text)
}

fn is_block(name: &str) -> bool {
    const BLOCKS: &[&str] = &[
        "address", "article", "aside", "blockquote", "br", "dd", "div", "dt", "figcaption",
        "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "p", "section",
        "td", "th", "tr",
    ];
    BLOCKS.iter().any(|b| b.eq_ignore_ascii_case(name))
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// An element located in a string, with the position of its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpan<'a> {
    /// The start tag token.
    pub tag: Token<'a>,
    /// Byte range of the element's content (empty for void elements).
    pub inner: Range<usize>,
    /// Byte offset just past the end tag (or where the content stops).
    pub end: usize,
}

impl<'a> ElementSpan<'a> {
    pub fn level(&self) -> Option<u8> {
        self.tag.heading_level()
    }

    pub fn inner_html<'s>(&self, src: &'s str) -> &'s str {
        &src[self.inner.clone()]
    }

    pub fn text(&self, src: &str) -> String {
        text_content(self.inner_html(src))
    }
}

/// Find every element whose (lowercase) name is accepted by `wanted`,
/// in document order.
///
/// Nested elements of the same name are each reported. An element left
/// open runs to the end of the input.
pub fn find_elements<'a>(html: &'a str, wanted: impl Fn(&str) -> bool) -> Vec<ElementSpan<'a>> {
    let mut found: Vec<ElementSpan<'a>> = Vec::new();
    // Indices into `found` of elements still waiting for their end tag.
    let mut open: Vec<usize> = Vec::new();

    for token in Scanner::new(html) {
        match token.kind {
            TokenKind::StartTag if wanted(&token.name.to_ascii_lowercase()) => {
                let end = token.end();
                found.push(ElementSpan {
                    tag: token,
                    inner: end..end,
                    end,
                });
                if !token.is_empty_element() {
                    open.push(found.len() - 1);
                }
            }
            TokenKind::EndTag if wanted(&token.name.to_ascii_lowercase()) => {
                if let Some(pos) = open
                    .iter()
                    .rposition(|&idx| found[idx].tag.name.eq_ignore_ascii_case(token.name))
                {
                    let idx = open.remove(pos);
                    found[idx].inner.end = token.start;
                    found[idx].end = token.end();
                }
            }
            _ => {}
        }
    }

    for idx in open {
        found[idx].inner.end = html.len();
        found[idx].end = html.len();
    }

    found
}

/// All `h1`..`h6` elements in document order.
pub fn headings(html: &str) -> Vec<ElementSpan<'_>> {
    find_elements(html, |name| super::scan::heading_level(name).is_some())
}

/// Text of the first heading in a fragment, if any heading has text.
pub fn first_heading_text(html: &str) -> Option<String> {
    headings(html)
        .into_iter()
        .map(|h| h.text(html))
        .find(|text| !text.is_empty())
}
