//! XHTML chapter documents.
//!
//! Manuscript HTML is forgiving; EPUB content documents are XML. Fragments
//! are parsed with html5ever and the tree is written back out as XHTML:
//! quoted attributes, self-closed void elements, decoded character
//! references and namespace declarations on SVG and MathML islands.

use html5ever::{Attribute, Namespace, QualName, ns};
use markup5ever_rcdom::{Handle, NodeData};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::error::{Error, Result};
use crate::transform::{escape_xml, find_first_element, is_void_element, is_xml_char, parse_fragment};

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";
const EPUB_NS: &str = "http://www.idpf.org/2007/ops";
const SVG_NS: &str = "http://www.w3.org/2000/svg";
const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Re-serialize an HTML fragment as well-formed XHTML.
///
/// The html5ever tree builder inserts implied end tags, drops stray ones and
/// closes anything left open. Void and childless foreign elements end in
/// `/>`. Doctypes and processing instructions are removed; comments are
/// kept with `--` broken up.
pub fn to_xhtml_fragment(html: &str) -> String {
    let dom = parse_fragment(html);
    let mut out = String::with_capacity(html.len() + html.len() / 8);

    if let Some(body) = find_first_element(&dom.document, "body") {
        for child in body.children.borrow().iter() {
            write_node(&mut out, child, &ns!(html));
        }
    }
    out
}

fn write_node(out: &mut String, handle: &Handle, parent_ns: &Namespace) {
    match &handle.data {
        NodeData::Text { contents } => push_text(out, &contents.borrow()),
        NodeData::Comment { contents } => {
            out.push_str("<!--");
            out.push_str(&sanitize_comment(contents));
            out.push_str("-->");
        }
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            // Template content lives in its own fragment.
            let content = template_contents.borrow().clone().unwrap_or_else(|| handle.clone());
            write_element(out, name, &attrs.borrow(), &content, parent_ns);
        }
        NodeData::Document | NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => {}
    }
}

fn write_element(
    out: &mut String,
    name: &QualName,
    attrs: &[Attribute],
    content: &Handle,
    parent_ns: &Namespace,
) {
    let html = name.ns == ns!(html);

    out.push('<');
    out.push_str(&name.local);
    if name.ns != *parent_ns {
        push_namespace_declarations(out, &name.ns);
    }
    for attr in attrs {
        push_attribute(out, attr, html);
    }

    let children = content.children.borrow();
    if (html && is_void_element(&name.local)) || (!html && children.is_empty()) {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let raw_text = html && matches!(&*name.local, "script" | "style");
    for child in children.iter() {
        match &child.data {
            NodeData::Text { contents } if raw_text => push_raw_text(out, &contents.borrow()),
            _ => write_node(out, child, &name.ns),
        }
    }

    out.push_str("</");
    out.push_str(&name.local);
    out.push('>');
}

/// Default namespace (and `xlink`) for an element that leaves its parent's namespace.
fn push_namespace_declarations(out: &mut String, namespace: &Namespace) {
    let uri = if *namespace == ns!(svg) {
        SVG_NS
    } else if *namespace == ns!(mathml) {
        MATHML_NS
    } else {
        XHTML_NS
    };
    out.push_str(" xmlns=\"");
    out.push_str(uri);
    out.push('"');
    if uri != XHTML_NS {
        out.push_str(" xmlns:xlink=\"");
        out.push_str(XLINK_NS);
        out.push('"');
    }
}

/// Write one attribute, skipping names XML cannot carry.
///
/// Namespace declarations are written by the serializer itself, and a
/// prefixed name is kept only when the prefix is bound in the chapter:
/// `xml` and `epub` everywhere, `xlink` inside SVG and MathML.
fn push_attribute(out: &mut String, attr: &Attribute, html: bool) {
    if attr.name.ns == ns!(xmlns) {
        return;
    }
    let name = match &attr.name.prefix {
        Some(prefix) => format!("{prefix}:{}", attr.name.local),
        None => attr.name.local.to_string(),
    };
    if name == "xmlns" || !is_xml_name(&name) {
        return;
    }
    if let Some((prefix, _)) = name.split_once(':') {
        let bound = matches!(prefix, "xml" | "epub") || (!html && prefix == "xlink");
        if !bound {
            return;
        }
    }

    out.push(' ');
    out.push_str(&name);
    out.push_str("=\"");
    out.push_str(&escape_xml(&attr.value));
    out.push('"');
}

fn push_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c if is_xml_char(c) => out.push(c),
            _ => out.push(char::REPLACEMENT_CHARACTER),
        }
    }
}

/// Script and style content is wrapped in CDATA when it holds markup characters.
fn push_raw_text(out: &mut String, text: &str) {
    let text: String = text
        .chars()
        .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
        .collect();
    if !text.contains(['<', '&']) {
        out.push_str(&text);
        return;
    }
    out.push_str("/*<![CDATA[*/");
    out.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
    out.push_str("/*]]>*/");
}

/// XML comments may not contain `--` or end in `-`.
fn sanitize_comment(text: &str) -> String {
    let mut clean: String = text.chars().filter(|&c| is_xml_char(c)).collect();
    while clean.contains("--") {
        clean = clean.replace("--", "- -");
    }
    if clean.ends_with('-') {
        clean.push(' ');
    }
    clean
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == ':')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

/// Wrap an XHTML body fragment in a complete EPUB 3 content document.
pub fn wrap_chapter(body: &str, title: &str, language: Option<&str>, stylesheet: Option<&str>) -> String {
    let lang = language
        .map(|lang| {
            let lang = escape_xml(lang);
            format!(" lang=\"{lang}\" xml:lang=\"{lang}\"")
        })
        .unwrap_or_default();
    let link = stylesheet
        .map(|href| {
            format!(
                "\n<link rel=\"stylesheet\" type=\"text/css\" href=\"{}\"/>",
                escape_xml(href)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="{XHTML_NS}" xmlns:epub="{EPUB_NS}"{lang}>
<head>
<title>{}</title>{link}
</head>
<body>
{}
</body>
</html>"#,
        escape_xml(title),
        body.trim()
    )
}

/// Parse a document with quick-xml and fail on the first well-formedness
/// error, including element and attribute prefixes with no namespace bound.
pub fn check_well_formed(xhtml: &str) -> Result<()> {
    let mut reader = NsReader::from_str(xhtml);
    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
                check_names(&reader, &e)?;
            }
            Event::Empty(e) => {
                if depth == 0 {
                    roots += 1;
                }
                check_names(&reader, &e)?;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(Error::Malformed(format!("{depth} element(s) left open")));
    }
    match roots {
        1 => Ok(()),
        0 => Err(Error::Malformed("no root element".to_string())),
        n => Err(Error::Malformed(format!("{n} root elements"))),
    }
}

fn check_names(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<()> {
    let (element, _) = reader.resolve_element(start.name());
    check_bound(element)?;
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Malformed(e.to_string()))?;
        let (resolved, _) = reader.resolve_attribute(attr.key);
        check_bound(resolved)?;
    }
    Ok(())
}

/// `xml` and `xmlns` are bound by definition.
fn check_bound(resolved: ResolveResult<'_>) -> Result<()> {
    match resolved {
        ResolveResult::Unknown(prefix) if prefix != b"xml" && prefix != b"xmlns" => Err(Error::Malformed(
            format!("unbound namespace prefix {:?}", String::from_utf8_lossy(&prefix)),
        )),
        _ => Ok(()),
    }
}
