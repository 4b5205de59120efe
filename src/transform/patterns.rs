//! Cached regex patterns for manuscript processing.
//!
//! Uses LazyLock to compile patterns once on first use.

use regex_lite::Regex;
use std::sync::LazyLock;

// === Decoding patterns ===

/// Matches `<meta charset="...">` and `<meta http-equiv ... content="...; charset=...">`
pub static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*charset\s*=\s*["']?\s*([A-Za-z0-9_:.\-]+)"#).unwrap()
});

/// Matches the encoding of an XML declaration
pub static XML_ENCODING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<\?xml[^>]*encoding\s*=\s*["']([A-Za-z0-9_.\-]+)["']"#).unwrap()
});

// === Page-break patterns ===

/// Matches CSS that forces a page break before an element
pub static BREAK_BEFORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:page-break-before|break-before)\s*:\s*(?:always|page|left|right|recto|verso)")
        .unwrap()
});

/// Matches CSS that forces a page break after an element
pub static BREAK_AFTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:page-break-after|break-after)\s*:\s*(?:always|page|left|right|recto|verso)")
        .unwrap()
});

/// Matches the body of a `<!-- pagebreak -->` comment
pub static PAGEBREAK_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*page[\s_-]?break\s*$").unwrap());

/// Matches a `pagebreak` / `page-break` token in a class attribute
pub static PAGEBREAK_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)page[_-]?break(?:\s|$)").unwrap());

/// Matches `\newpage` or `\pagebreak` alone on a Markdown line
pub static MARKDOWN_PAGEBREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\\(?:newpage|pagebreak)[ \t]*$").unwrap());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_break_before() {
        assert!(BREAK_BEFORE_RE.is_match("page-break-before: always"));
        assert!(BREAK_BEFORE_RE.is_match("color: red; break-before:page"));
        assert!(!BREAK_BEFORE_RE.is_match("page-break-before: avoid"));
        assert!(!BREAK_BEFORE_RE.is_match("page-break-after: always"));
    }

    #[test]
    fn test_break_after() {
        assert!(BREAK_AFTER_RE.is_match("PAGE-BREAK-AFTER: ALWAYS"));
        assert!(!BREAK_AFTER_RE.is_match("break-after: auto"));
    }

    #[test]
    fn test_pagebreak_comment() {
        assert!(PAGEBREAK_COMMENT_RE.is_match(" pagebreak "));
        assert!(PAGEBREAK_COMMENT_RE.is_match("page-break"));
        assert!(PAGEBREAK_COMMENT_RE.is_match("Page Break"));
        assert!(!PAGEBREAK_COMMENT_RE.is_match("no pagebreak here"));
    }

    #[test]
    fn test_pagebreak_class() {
        assert!(PAGEBREAK_CLASS_RE.is_match("pagebreak"));
        assert!(PAGEBREAK_CLASS_RE.is_match("rule page-break"));
        assert!(!PAGEBREAK_CLASS_RE.is_match("nopagebreak"));
    }

    #[test]
    fn test_markdown_pagebreak() {
        let md = "para\n\n\\newpage\n\nnext\n  \\pagebreak\n";
        assert_eq!(MARKDOWN_PAGEBREAK_RE.find_iter(md).count(), 2);
        assert!(!MARKDOWN_PAGEBREAK_RE.is_match("inline \\newpage text"));
    }
}
