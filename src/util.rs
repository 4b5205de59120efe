//! Byte decoding helpers for manuscript input.

use std::borrow::Cow;

use crate::transform::patterns::{META_CHARSET_RE, XML_ENCODING_RE};

/// How far into a document to look for a charset declaration.
const SNIFF_LIMIT: usize = 1024;

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from `<meta charset>` or `<?xml encoding="..."?>`)
/// 3. Falls back to Windows-1252 (common in word-processor HTML exports)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Find the charset a document declares for itself, if any.
///
/// Only the first kilobyte is inspected; declarations are required to
/// appear that early.
pub fn sniff_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(SNIFF_LIMIT)];
    let head = String::from_utf8_lossy(head);

    XML_ENCODING_RE
        .captures(&head)
        .or_else(|| META_CHARSET_RE.captures(&head))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// Decode manuscript bytes using whatever charset the document declares.
pub fn decode_document(bytes: &[u8]) -> Cow<'_, str> {
    let hint = sniff_charset(bytes);
    decode_text(bytes, hint.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_text("Héllo".as_bytes(), None), "Héllo");
    }

    #[test]
    fn test_decode_utf8_bom() {
        let bytes = b"\xEF\xBB\xBFHello";
        assert_eq!(decode_text(bytes, None), "Hello");
    }

    #[test]
    fn test_decode_falls_back_to_cp1252() {
        // 0x93/0x94 are curly quotes in Windows-1252 and invalid UTF-8.
        let bytes = b"\x93quoted\x94";
        assert_eq!(decode_text(bytes, None), "\u{201C}quoted\u{201D}");
    }

    #[test]
    fn test_decode_uses_hint() {
        // 0xE1 is "á" in Windows-1252 and "α" in ISO-8859-7.
        let bytes = b"\xE1";
        assert_eq!(decode_text(bytes, Some("iso-8859-7")), "\u{03B1}");
    }

    #[test]
    fn test_sniff_meta_charset() {
        let html = br#"<html><head><meta charset="ISO-8859-1"></head>"#;
        assert_eq!(sniff_charset(html).as_deref(), Some("iso-8859-1"));
    }

    #[test]
    fn test_sniff_http_equiv_charset() {
        let html = br#"<meta http-equiv="Content-Type" content="text/html; charset=windows-1251">"#;
        assert_eq!(sniff_charset(html).as_deref(), Some("windows-1251"));
    }

    #[test]
    fn test_sniff_xml_declaration() {
        let xml = br#"<?xml version="1.0" encoding="Shift_JIS"?><html/>"#;
        assert_eq!(sniff_charset(xml).as_deref(), Some("shift_jis"));
    }

    #[test]
    fn test_sniff_none() {
        assert_eq!(sniff_charset(b"<p>plain</p>"), None);
    }
}
