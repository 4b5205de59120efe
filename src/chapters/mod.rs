//! Turning one manuscript body into chapter documents.
//!
//! - [`split`]: cut the body at chapter headings and page breaks
//! - [`slugify`]: readable, unique ids for headings
//! - [`ids`]: inject those ids into heading start tags
//! - [`toc`]: nest the headings into a table of contents
//! - [`links`]: repoint `#fragment` links at the file that holds the target

mod ids;
mod links;
mod slugify;
mod split;
mod toc;

pub use ids::{inject_heading_ids, reserve_existing_ids};
pub use links::{LinkTargets, repair_links};
pub use slugify::{FALLBACK_SLUG, IdRegistry, slugify};
pub use split::{Section, split_chapters};
pub use toc::build_toc;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped in URL fragments.
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// Manifest id of the chapter at `index` (0-based): `chapter-001`.
pub fn chapter_id(index: usize) -> String {
    format!("chapter-{:03}", index + 1)
}

/// File name of the chapter at `index` (0-based): `chapter_001.xhtml`.
pub fn chapter_file_name(index: usize) -> String {
    format!("chapter_{:03}.xhtml", index + 1)
}

/// `file#id` with the id percent-encoded.
pub fn fragment_href(file: &str, id: &str) -> String {
    format!("{file}#{}", utf8_percent_encode(id, FRAGMENT))
}
