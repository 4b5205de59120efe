//! Output documents.
//!
//! Chapters leave the pipeline as standalone XHTML content documents. OCF
//! packaging (zip, OPF, navigation document) is left to the caller.

mod xhtml;

pub use xhtml::{check_well_formed, to_xhtml_fragment, wrap_chapter};
