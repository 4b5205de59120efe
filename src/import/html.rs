//! HTML manuscripts.

use super::Manuscript;
use crate::error::Result;
use crate::transform::{Scanner, TokenKind, collapse_whitespace, decode_entities};

/// Pull the title, language and body content out of an HTML document.
///
/// Input without a `<body>` is treated as a fragment: doctype, `<head>` and
/// the `<html>` tags are dropped and everything else is kept.
pub(super) fn parse(source: &str) -> Result<Manuscript> {
    let mut title: Option<String> = None;
    let mut title_text = String::new();
    let mut in_title = false;

    let mut html_lang = None;
    let mut body_lang = None;
    let mut body_start = None;
    let mut body_end = None;

    for token in Scanner::new(source) {
        match token.kind {
            TokenKind::StartTag if token.is("html") => {
                html_lang = token.attr("lang").or_else(|| token.attr("xml:lang"));
            }
            TokenKind::StartTag if token.is("body") && body_start.is_none() => {
                body_lang = token.attr("lang").or_else(|| token.attr("xml:lang"));
                body_start = Some(token.end());
            }
            TokenKind::EndTag if token.is("body") => body_end = Some(token.start),
            TokenKind::StartTag if token.is("title") && title.is_none() && body_start.is_none() => {
                in_title = true;
            }
            TokenKind::EndTag if token.is("title") && in_title => {
                in_title = false;
                let text = collapse_whitespace(&decode_entities(&title_text));
                if !text.is_empty() {
                    title = Some(text);
                }
            }
            TokenKind::Text if in_title => title_text.push_str(token.raw),
            _ => {}
        }
    }

    let body = match body_start {
        Some(start) => {
            let end = body_end.filter(|&end| end >= start).unwrap_or(source.len());
            source[start..end].to_string()
        }
        None => strip_document_shell(source),
    };

    Ok(Manuscript {
        title,
        language: html_lang.or(body_lang).filter(|lang| !lang.trim().is_empty()),
        body,
    })
}

/// Drop doctype, processing instructions, `<head>` and `<html>` tags.
fn strip_document_shell(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut in_head = false;

    for token in Scanner::new(source) {
        match token.kind {
            TokenKind::Other if !token.raw.starts_with("<![CDATA[") => {}
            TokenKind::StartTag if token.is("html") => {}
            TokenKind::EndTag if token.is("html") => {}
            TokenKind::StartTag if token.is("head") => in_head = !token.self_closing,
            TokenKind::EndTag if token.is("head") => in_head = false,
            _ if in_head => {}
            _ => out.push_str(token.raw),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_document() {
        let src = r#"<?xml version="1.0"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" lang="de">
<head><title>Der  Titel &amp; mehr</title><meta charset="utf-8"/></head>
<body class="x"><h1>Eins</h1><p>Text</p></body>
</html>"#;
        let manuscript = parse(src).unwrap();
        assert_eq!(manuscript.title.as_deref(), Some("Der Titel & mehr"));
        assert_eq!(manuscript.language.as_deref(), Some("de"));
        assert_eq!(manuscript.body, "<h1>Eins</h1><p>Text</p>");
    }

    #[test]
    fn test_xml_lang_and_body_lang() {
        let manuscript = parse(r#"<html xml:lang="fr"><body><p>a</p></body></html>"#).unwrap();
        assert_eq!(manuscript.language.as_deref(), Some("fr"));

        let manuscript = parse(r#"<html><body lang="he"><p>a</p></body></html>"#).unwrap();
        assert_eq!(manuscript.language.as_deref(), Some("he"));
    }

    #[test]
    fn test_fragment() {
        let manuscript = parse("<h1>One</h1>\n<p>Two</p>").unwrap();
        assert_eq!(manuscript.title, None);
        assert_eq!(manuscript.language, None);
        assert_eq!(manuscript.body, "<h1>One</h1>\n<p>Two</p>");
    }

    #[test]
    fn test_document_without_body() {
        let src = "<!DOCTYPE html><html lang=\"en\"><head><title>T</title><style>p{}</style></head><p>Hi</p></html>";
        let manuscript = parse(src).unwrap();
        assert_eq!(manuscript.title.as_deref(), Some("T"));
        assert_eq!(manuscript.language.as_deref(), Some("en"));
        assert_eq!(manuscript.body, "<p>Hi</p>");
    }

    #[test]
    fn test_unclosed_body() {
        let manuscript = parse("<html><body><p>cut off").unwrap();
        assert_eq!(manuscript.body, "<p>cut off");
    }

    #[test]
    fn test_title_in_body_ignored() {
        let manuscript = parse("<body><svg><title>icon</title></svg><p>x</p></body>").unwrap();
        assert_eq!(manuscript.title, None);
    }
}
