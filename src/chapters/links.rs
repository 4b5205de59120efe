//! Repair of in-document links broken by splitting.
//!
//! A manuscript links within itself with `href="#id"`. Once the target ends
//! up in another chapter file, the link must name that file.

use std::cell::Cell;
use std::collections::HashMap;

use log::debug;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use percent_encoding::percent_decode_str;

use super::fragment_href;
use crate::error::Result;
use crate::transform::{Scanner, TokenKind};

/// Which chapter file holds each element id.
#[derive(Debug, Default, Clone)]
pub struct LinkTargets {
    by_id: HashMap<String, String>,
}

impl LinkTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every id in a chapter. The first chapter to claim an id wins.
    pub fn add_chapter(&mut self, href: &str, html: &str) {
        for token in Scanner::new(html) {
            if token.kind != TokenKind::StartTag {
                continue;
            }
            if let Some(id) = token.attr("id").filter(|id| !id.is_empty()) {
                self.by_id.entry(id).or_insert_with(|| href.to_string());
            }
        }
    }

    /// Chapter file holding `id`.
    pub fn chapter_of(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Point `#fragment` links at the chapter file that now holds the target.
///
/// Returns the rewritten document and the number of links changed. Links
/// to ids in the same chapter, and to unknown ids, are left alone.
pub fn repair_links(html: &str, own_href: &str, targets: &LinkTargets) -> Result<(String, usize)> {
    let repaired = Cell::new(0usize);

    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("a[href]", |el| {
                let Some(href) = el.get_attribute("href") else {
                    return Ok(());
                };
                let Some(fragment) = href.strip_prefix('#') else {
                    return Ok(());
                };
                let id = percent_decode_str(fragment).decode_utf8_lossy();

                match targets.chapter_of(&id) {
                    Some(target) if target != own_href => {
                        el.set_attribute("href", &fragment_href(target, &id))?;
                        repaired.set(repaired.get() + 1);
                    }
                    Some(_) => {}
                    None => debug!("link to unknown id {id:?} in {own_href}"),
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )?;

    Ok((output, repaired.get()))
}
