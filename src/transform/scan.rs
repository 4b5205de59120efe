//! Byte-offset tokenizer for HTML text.
//!
//! This is not a parser: it never builds a tree and never repairs markup.
//! It yields tags, text and comments with their exact positions so callers
//! can splice the original string without re-serializing untouched content.

use std::ops::Range;

use memchr::{memchr, memmem};

/// Elements that never have content or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text rather than markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    StartTag,
    EndTag,
    Text,
    Comment,
    /// Doctype, processing instruction or CDATA section.
    Other,
}

/// A single token borrowed from the scanned source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Tag name as written (empty for non-tags).
    pub name: &'a str,
    /// The token's exact source text.
    pub raw: &'a str,
    /// Byte offset of `raw` in the source.
    pub start: usize,
    /// Written as `<tag/>`.
    pub self_closing: bool,
}

impl<'a> Token<'a> {
    pub fn end(&self) -> usize {
        self.start + self.raw.len()
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Case-insensitive tag name check.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn is_start(&self, name: &str) -> bool {
        self.kind == TokenKind::StartTag && self.is(name)
    }

    pub fn is_end(&self, name: &str) -> bool {
        self.kind == TokenKind::EndTag && self.is(name)
    }

    /// A start tag that opens no content: self-closed or a void element.
    pub fn is_empty_element(&self) -> bool {
        self.kind == TokenKind::StartTag && (self.self_closing || is_void_element(self.name))
    }

    /// Heading level for `h1`..`h6` start or end tags.
    pub fn heading_level(&self) -> Option<u8> {
        heading_level(self.name)
    }

    /// Parsed attributes of a start tag.
    pub fn attrs(&self) -> Vec<Attribute<'a>> {
        if self.kind != TokenKind::StartTag {
            return Vec::new();
        }
        parse_attributes(self.raw)
    }

    /// Value of one attribute, entity-decoded.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.attrs()
            .into_iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs().iter().any(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Comment body without the `<!--` and `-->` delimiters.
    pub fn comment_text(&self) -> &'a str {
        let inner = self.raw.strip_prefix("<!--").unwrap_or(self.raw);
        inner.strip_suffix("-->").unwrap_or(inner)
    }

    /// Byte offset where a new attribute can be inserted into a start tag.
    pub fn attribute_insert_point(&self) -> usize {
        let trimmed = self.raw.trim_end_matches('>');
        let trimmed = trimmed.trim_end_matches('/');
        let trimmed = trimmed.trim_end();
        self.start + trimmed.len()
    }
}

pub fn heading_level(name: &str) -> Option<u8> {
    let bytes = name.as_bytes();
    if bytes.len() == 2 && (bytes[0] == b'h' || bytes[0] == b'H') && (b'1'..=b'6').contains(&bytes[1])
    {
        Some(bytes[1] - b'0')
    } else {
        None
    }
}

/// An attribute as written in a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    /// Raw value without quotes (`None` for valueless attributes).
    pub raw_value: Option<&'a str>,
    /// Byte range of the whole `name="value"` text within the tag.
    pub span: Range<usize>,
}

impl Attribute<'_> {
    /// Entity-decoded value; valueless attributes yield an empty string.
    pub fn value(&self) -> String {
        self.raw_value
            .map(|v| super::html::decode_entities(v).into_owned())
            .unwrap_or_default()
    }
}

/// Parse the attributes of a raw start tag such as `<a href="x" hidden>`.
pub fn parse_attributes(tag: &str) -> Vec<Attribute<'_>> {
    let bytes = tag.as_bytes();
    let mut attrs = Vec::new();

    // Skip `<` and the tag name.
    let mut i = 1;
    while i < bytes.len() && !is_tag_space(bytes[i]) && bytes[i] != b'>' && bytes[i] != b'/' {
        i += 1;
    }

    loop {
        while i < bytes.len() && (is_tag_space(bytes[i]) || bytes[i] == b'/') {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] == b'>' {
            break;
        }

        let name_start = i;
        while i < bytes.len()
            && !is_tag_space(bytes[i])
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let name = &tag[name_start..i];

        while i < bytes.len() && is_tag_space(bytes[i]) {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            attrs.push(Attribute {
                name,
                raw_value: None,
                span: name_start..name_start + name.len(),
            });
            continue;
        }

        // Skip `=` and whitespace before the value.
        i += 1;
        while i < bytes.len() && is_tag_space(bytes[i]) {
            i += 1;
        }

        let raw_value = match bytes.get(i).copied() {
            Some(quote) if quote == b'"' || quote == b'\'' => {
                let value_start = i + 1;
                let value_end = memchr(quote, &bytes[value_start..])
                    .map(|p| value_start + p)
                    .unwrap_or(bytes.len());
                i = (value_end + 1).min(bytes.len());
                &tag[value_start..value_end]
            }
            _ => {
                let value_start = i;
                while i < bytes.len() && !is_tag_space(bytes[i]) && bytes[i] != b'>' {
                    i += 1;
                }
                &tag[value_start..i]
            }
        };

        attrs.push(Attribute {
            name,
            raw_value: Some(raw_value),
            span: name_start..i,
        });
    }

    attrs
}

fn is_tag_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

/// Iterator over the tokens of an HTML string.
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    /// Set after `<script>`/`<style>`: the element whose end tag ends raw text.
    raw_text: Option<&'a str>,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            raw_text: None,
        }
    }

    fn token(&mut self, kind: TokenKind, name: &'a str, end: usize, self_closing: bool) -> Token<'a> {
        let start = self.pos;
        self.pos = end;
        Token {
            kind,
            name,
            raw: &self.src[start..end],
            start,
            self_closing,
        }
    }

    fn text_until_next_tag(&mut self, from: usize) -> Token<'a> {
        let bytes = self.src.as_bytes();
        let end = memchr(b'<', &bytes[from..])
            .map(|p| from + p)
            .unwrap_or(bytes.len());
        self.token(TokenKind::Text, "", end, false)
    }

    fn raw_text_token(&mut self, element: &'a str) -> Token<'a> {
        let bytes = self.src.as_bytes();
        let mut search = self.pos;
        let end = loop {
            match memmem::find(&bytes[search..], b"</") {
                Some(p) => {
                    let at = search + p;
                    let name_end = at + 2 + element.len();
                    if name_end <= bytes.len()
                        && self.src[at + 2..name_end].eq_ignore_ascii_case(element)
                    {
                        break at;
                    }
                    search = at + 2;
                }
                None => break bytes.len(),
            }
        };
        self.token(TokenKind::Text, "", end, false)
    }

    /// End of a tag starting at `self.pos`, honoring quoted attribute values.
    fn tag_end(&self) -> Option<usize> {
        let bytes = self.src.as_bytes();
        let mut quote = None;
        for (offset, &b) in bytes[self.pos + 1..].iter().enumerate() {
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None if b == b'"' || b == b'\'' => quote = Some(b),
                None if b == b'>' => return Some(self.pos + 1 + offset + 1),
                None => {}
            }
        }
        None
    }

    fn name_at(&self, from: usize) -> &'a str {
        let bytes = self.src.as_bytes();
        let mut end = from;
        while end < bytes.len()
            && !is_tag_space(bytes[end])
            && bytes[end] != b'>'
            && bytes[end] != b'/'
        {
            end += 1;
        }
        &self.src[from..end]
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let bytes = self.src.as_bytes();
        if self.pos >= bytes.len() {
            return None;
        }

        if let Some(element) = self.raw_text.take()
            && !self.src[self.pos..].starts_with("</")
        {
            return Some(self.raw_text_token(element));
        }

        if bytes[self.pos] != b'<' {
            return Some(self.text_until_next_tag(self.pos));
        }

        let rest = &self.src[self.pos..];

        if rest.starts_with("<!--") {
            let end = memmem::find(&bytes[self.pos + 4..], b"-->")
                .map(|p| self.pos + 4 + p + 3)
                .unwrap_or(bytes.len());
            return Some(self.token(TokenKind::Comment, "", end, false));
        }

        if rest.starts_with("<![CDATA[") {
            let end = memmem::find(&bytes[self.pos..], b"]]>")
                .map(|p| self.pos + p + 3)
                .unwrap_or(bytes.len());
            return Some(self.token(TokenKind::Other, "", end, false));
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = memchr(b'>', &bytes[self.pos..])
                .map(|p| self.pos + p + 1)
                .unwrap_or(bytes.len());
            return Some(self.token(TokenKind::Other, "", end, false));
        }

        let (kind, name_start) = if rest.starts_with("</") {
            (TokenKind::EndTag, self.pos + 2)
        } else {
            (TokenKind::StartTag, self.pos + 1)
        };

        // `<` not followed by a tag name is literal text.
        if !bytes.get(name_start).is_some_and(u8::is_ascii_alphabetic) {
            return Some(self.text_until_next_tag(self.pos + 1));
        }

        let Some(end) = self.tag_end() else {
            // Unterminated tag: the remainder is text.
            return Some(self.token(TokenKind::Text, "", bytes.len(), false));
        };

        let name = self.name_at(name_start);
        let self_closing = kind == TokenKind::StartTag && self.src[..end - 1].ends_with('/');
        let token = self.token(kind, name, end, self_closing);

        if kind == TokenKind::StartTag && !self_closing {
            self.raw_text = RAW_TEXT_ELEMENTS
                .iter()
                .find(|raw| name.eq_ignore_ascii_case(raw))
                .map(|_| name);
        }

        Some(token)
    }
}

/// Tracks open elements while walking tokens, tolerating sloppy markup.
#[derive(Debug, Default)]
pub struct ElementStack {
    open: Vec<String>,
}

impl ElementStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn top(&self) -> Option<&str> {
        self.open.last().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.open.iter().any(|open| open.eq_ignore_ascii_case(name))
    }

    /// Update the stack for one token.
    ///
    /// An end tag pops back to its matching start tag, closing anything left
    /// open inside it; an end tag with no matching start tag is ignored.
    pub fn apply(&mut self, token: &Token<'_>) {
        match token.kind {
            TokenKind::StartTag if !token.is_empty_element() => {
                self.open.push(token.name.to_ascii_lowercase());
            }
            TokenKind::EndTag => {
                if let Some(pos) = self
                    .open
                    .iter()
                    .rposition(|open| open.eq_ignore_ascii_case(token.name))
                {
                    self.open.truncate(pos);
                }
            }
            _ => {}
        }
    }
}
