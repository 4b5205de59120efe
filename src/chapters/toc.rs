//! Table of contents from chapter headings.

use crate::book::{Chapter, TocEntry};

use super::fragment_href;

/// Build a nested table of contents from every chapter's headings.
///
/// Nesting follows heading levels across chapter boundaries, so a chapter
/// split at `h2` nests under the preceding `h1`. Headings deeper than
/// `depth` are left out. A chapter with no listed heading becomes a
/// top-level entry pointing at its file.
pub fn build_toc(chapters: &[Chapter], depth: u8) -> Vec<TocEntry> {
    let mut roots = Vec::new();
    // Open entries with their heading level, outermost first.
    let mut stack: Vec<(u8, TocEntry)> = Vec::new();

    for chapter in chapters {
        let mut listed = chapter
            .headings
            .iter()
            .filter(|h| h.level <= depth && !h.title.is_empty())
            .peekable();

        if listed.peek().is_none() {
            close_entries(&mut stack, &mut roots, 0);
            roots.push(TocEntry::new(&chapter.title, &chapter.href));
            continue;
        }

        for heading in listed {
            close_entries(&mut stack, &mut roots, heading.level);
            let href = fragment_href(&chapter.href, &heading.id);
            stack.push((heading.level, TocEntry::new(&heading.title, href)));
        }
    }

    close_entries(&mut stack, &mut roots, 0);
    roots
}

/// Close every open entry at `level` or deeper, attaching each to its parent.
fn close_entries(stack: &mut Vec<(u8, TocEntry)>, roots: &mut Vec<TocEntry>, level: u8) {
    while stack.last().is_some_and(|(open, _)| *open >= level) {
        let Some((_, entry)) = stack.pop() else {
            break;
        };
        match stack.last_mut() {
            Some((_, parent)) => parent.children.push(entry),
            None => roots.push(entry),
        }
    }
}
