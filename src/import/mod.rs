//! Manuscript loading.
//!
//! Every input format is reduced to a [`Manuscript`]: one flattened HTML
//! body fragment plus whatever title and language the source declared.
//! Splitting and post-processing only ever see that fragment.

mod html;
mod markdown;

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::util::{decode_document, decode_text};

/// Source formats a manuscript can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Markdown,
    Html,
}

impl Format {
    /// Detect the format from a file extension.
    ///
    /// Word documents are rejected: they must be converted to HTML first.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "md" | "markdown" => Ok(Format::Markdown),
            "html" | "htm" | "xhtml" => Ok(Format::Html),
            "docx" | "doc" => Err(Error::UnsupportedFormat(format!(
                "{} (convert Word documents to HTML first)",
                path.display()
            ))),
            "" => Err(Error::UnsupportedFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// A manuscript flattened into a single HTML body fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manuscript {
    /// Title declared by the source (`<title>` or the first `h1`).
    pub title: Option<String>,
    /// Language declared by the source (`<html lang>`).
    pub language: Option<String>,
    /// Body content, without `<body>` itself.
    pub body: String,
}

impl Manuscript {
    /// Wrap an existing body fragment.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Read an HTML document or fragment.
    pub fn from_html(source: &str) -> Result<Self> {
        html::parse(source)?.non_empty()
    }

    /// Render Markdown (CommonMark with GFM extensions and footnotes).
    pub fn from_markdown(source: &str) -> Result<Self> {
        markdown::parse(source)?.non_empty()
    }

    /// Decode and read raw bytes in the given format.
    pub fn from_bytes(bytes: &[u8], format: Format) -> Result<Self> {
        match format {
            Format::Html => Self::from_html(&decode_document(bytes)),
            Format::Markdown => Self::from_markdown(&decode_text(bytes, None)),
        }
    }

    /// Read a manuscript file, choosing the format by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let bytes = fs::read(path)?;
        debug!("loading {} as {format:?} ({} bytes)", path.display(), bytes.len());
        Self::from_bytes(&bytes, format)
    }

    fn non_empty(self) -> Result<Self> {
        if self.body.trim().is_empty() {
            return Err(Error::EmptyDocument);
        }
        Ok(self)
    }
}
