//! Heading id injection.

use log::debug;

use super::slugify::{IdRegistry, slugify};
use crate::book::HeadingRef;
use crate::transform::{Scanner, TokenKind, escape_xml, headings};

/// Reserve every `id` attribute already present in `html`.
///
/// Duplicate ids in the input are reported at debug level and left alone.
pub fn reserve_existing_ids(html: &str, registry: &mut IdRegistry) {
    for token in Scanner::new(html) {
        if token.kind != TokenKind::StartTag {
            continue;
        }
        if let Some(id) = token.attr("id")
            && !id.is_empty()
            && !registry.reserve(&id)
        {
            debug!("duplicate id {id:?} in manuscript");
        }
    }
}

/// Give every `h1`..`h6` without an id one derived from its text.
///
/// Headings that already carry an id keep it. Returns the rewritten
/// fragment and every heading in document order.
pub fn inject_heading_ids(html: &str, registry: &mut IdRegistry) -> (String, Vec<HeadingRef>) {
    let spans = headings(html);
    let mut out = String::with_capacity(html.len() + spans.len() * 16);
    let mut refs = Vec::with_capacity(spans.len());
    let mut copied = 0;

    for span in &spans {
        let title = span.text(html);
        let level = span.level().unwrap_or(1);

        let id = match span.tag.attr("id").filter(|id| !id.is_empty()) {
            Some(existing) => existing,
            None => {
                let id = registry.claim(&slugify(&title));
                debug!("h{level} {title:?} -> #{id}");

                let attribute = format!("id=\"{}\"", escape_xml(&id));
                // An empty `id=""` is replaced in place rather than duplicated.
                let empty_id = span
                    .tag
                    .attrs()
                    .into_iter()
                    .find(|a| a.name.eq_ignore_ascii_case("id"));
                match empty_id {
                    Some(existing) => {
                        let from = span.tag.start + existing.span.start;
                        out.push_str(&html[copied..from]);
                        out.push_str(&attribute);
                        copied = span.tag.start + existing.span.end;
                    }
                    None => {
                        let insert_at = span.tag.attribute_insert_point();
                        out.push_str(&html[copied..insert_at]);
                        out.push(' ');
                        out.push_str(&attribute);
                        copied = insert_at;
                    }
                }
                id
            }
        };

        refs.push(HeadingRef { level, id, title });
    }

    out.push_str(&html[copied..]);
    (out, refs)
}
