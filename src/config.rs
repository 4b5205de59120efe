//! Conversion settings.
//!
//! Every section has sensible defaults, so a config file only needs the
//! keys it wants to change:
//!
//! ```
//! use quire::ConvertConfig;
//!
//! let config = ConvertConfig::from_json(r#"{ "split": { "level": 2 }, "language": "fr" }"#)?;
//! assert_eq!(config.split.level, 2);
//! assert!(config.split.on_page_break);
//! # Ok::<(), quire::Error>(())
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// How a manuscript is cut into chapters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    /// Deepest heading level that starts a new chapter (1-6).
    pub level: u8,
    /// Also start a new chapter at page-break markers.
    pub on_page_break: bool,
    /// Title for untitled content that precedes the first chapter.
    pub front_matter_title: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            level: 1,
            on_page_break: true,
            front_matter_title: "Front Matter".to_string(),
        }
    }
}

/// Accessibility post-processing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessibilityConfig {
    /// Rewrite attributes (table header scope, DPUB-ARIA roles, ...).
    pub fix: bool,
    /// Treat images without `alt` as decorative and mark them so.
    pub decorative_images: bool,
    /// Free-form `schema:accessibilitySummary` text.
    pub summary: Option<String>,
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            fix: true,
            decorative_images: false,
            summary: None,
        }
    }
}

/// Configuration for a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    pub split: SplitConfig,
    /// Deepest heading level listed in the table of contents (1-6).
    pub toc_depth: u8,
    /// Document language; overrides whatever the manuscript declares.
    pub language: Option<String>,
    /// Stylesheet href linked from every chapter.
    pub stylesheet: Option<String>,
    /// Book title; falls back to the manuscript's own title.
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub identifier: Option<String>,
    pub accessibility: AccessibilityConfig,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            split: SplitConfig::default(),
            toc_depth: 2,
            language: None,
            stylesheet: None,
            title: None,
            authors: Vec::new(),
            identifier: None,
            accessibility: AccessibilityConfig::default(),
        }
    }
}

impl ConvertConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=6).contains(&self.split.level) {
            return Err(Error::InvalidConfig(format!(
                "split.level must be between 1 and 6, got {}",
                self.split.level
            )));
        }
        if !(1..=6).contains(&self.toc_depth) {
            return Err(Error::InvalidConfig(format!(
                "toc_depth must be between 1 and 6, got {}",
                self.toc_depth
            )));
        }
        Ok(())
    }

    pub fn with_split_level(mut self, level: u8) -> Self {
        self.split.level = level;
        self
    }

    pub fn with_page_breaks(mut self, enabled: bool) -> Self {
        self.split.on_page_break = enabled;
        self
    }

    pub fn with_toc_depth(mut self, depth: u8) -> Self {
        self.toc_depth = depth;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_stylesheet(mut self, href: impl Into<String>) -> Self {
        self.stylesheet = Some(href.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_accessibility(mut self, accessibility: AccessibilityConfig) -> Self {
        self.accessibility = accessibility;
        self
    }
}
