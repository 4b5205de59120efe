//! # quire
//!
//! Turns Markdown and HTML manuscripts into the chapter documents of an
//! EPUB 3 book.
//!
//! ## Features
//!
//! - Split a manuscript into chapters at headings and page breaks
//! - Give every heading a stable, unique id and build a nested table of contents
//! - Repair `#fragment` links that splitting moved into another chapter
//! - Rewrite `lang`, `xml:lang` and `dir`, including right-to-left text
//! - Apply accessibility fixes, audit the result, and describe it in
//!   `schema:` metadata
//!
//! Packaging the chapters (OCF zip, OPF, navigation document) is left to the
//! caller.
//!
//! ## Quick Start
//!
//! ```no_run
//! use quire::{ConvertConfig, Converter};
//!
//! let config = ConvertConfig::from_path("quire.json")?;
//! let conversion = Converter::new().with_config(config).convert_path("manuscript.md")?;
//!
//! for chapter in &conversion.book.chapters {
//!     println!("{} {}", chapter.href, chapter.title);
//! }
//! for issue in &conversion.report.issues {
//!     eprintln!("{issue}");
//! }
//! # Ok::<(), quire::Error>(())
//! ```
//!
//! ## Working with Manuscripts
//!
//! A [`Manuscript`] is a single HTML body fragment. Build one directly when
//! the HTML comes from elsewhere (a Word converter, a template):
//!
//! ```
//! use quire::{Converter, Manuscript};
//!
//! let manuscript = Manuscript::new("<h1>Start</h1><p>Once.</p><h1>End</h1><p>Done.</p>")
//!     .with_title("A Short Book")
//!     .with_language("en");
//! let conversion = Converter::new().convert(manuscript)?;
//!
//! assert_eq!(conversion.book.chapters[1].headings[0].id, "end");
//! assert_eq!(conversion.book.metadata.language, "en");
//! # Ok::<(), quire::Error>(())
//! ```

pub mod a11y;
pub mod book;
pub mod chapters;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod lang;
pub mod pipeline;
pub mod transform;
pub(crate) mod util;

pub use a11y::{AccessibilityReport, Issue, IssueKind};
pub use book::{Book, Chapter, HeadingRef, MetaProperty, Metadata, TocEntry};
pub use config::{AccessibilityConfig, ConvertConfig, SplitConfig};
pub use error::{Error, Result};
pub use import::{Format, Manuscript};
pub use pipeline::{Conversion, Converter, Pass, PassContext, PassWarning};
