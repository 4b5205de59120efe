//! The conversion pipeline.
//!
//! A manuscript goes through fixed stages:
//!
//! 1. normalize the body to XHTML and split it into sections
//! 2. reserve every existing id, then give headings ids
//! 3. wrap each section in a content document
//! 4. run the post-processing [`Pass`]es on every chapter: link repair,
//!    language, accessibility fixes, well-formedness check
//! 5. audit, then build the table of contents and metadata
//!
//! Only loading and splitting can fail a conversion. A pass that fails on a
//! chapter is logged, recorded as a [`PassWarning`], and the chapter is left
//! as it was before that pass.

use std::cell::Cell;
use std::fmt;
use std::path::Path;

use log::{debug, info, warn};

use crate::a11y::{AccessibilityReport, accessibility_metadata, audit, fix_chapter};
use crate::book::{Book, Chapter, Metadata};
use crate::chapters::{
    IdRegistry, LinkTargets, build_toc, chapter_file_name, chapter_id, inject_heading_ids,
    repair_links, reserve_existing_ids, split_chapters,
};
use crate::config::ConvertConfig;
use crate::error::{Error, Result};
use crate::export::{check_well_formed, to_xhtml_fragment, wrap_chapter};
use crate::import::Manuscript;
use crate::lang::{LanguageSettings, apply_language};
use crate::transform::text_content;

/// Language used in metadata when neither config nor manuscript has one.
const UNDETERMINED_LANGUAGE: &str = "und";

/// Shared state handed to every pass.
pub struct PassContext<'a> {
    pub config: &'a ConvertConfig,
    pub language: &'a LanguageSettings,
    /// Book-wide id index for link repair.
    pub targets: &'a LinkTargets,
}

/// A post-processing step applied to each finished chapter.
pub trait Pass {
    /// Short name used in logs and warnings.
    fn name(&self) -> &'static str;

    /// Rewrite (or check) one chapter in place.
    fn apply(&self, chapter: &mut Chapter, ctx: &PassContext<'_>) -> Result<()>;
}

/// A pass that failed on one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassWarning {
    pub pass: String,
    /// Id of the chapter the pass failed on.
    pub chapter: String,
    pub message: String,
}

impl fmt::Display for PassWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pass failed on {}: {}", self.pass, self.chapter, self.message)
    }
}

/// Everything a conversion produces.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub book: Book,
    pub report: AccessibilityReport,
    pub warnings: Vec<PassWarning>,
}

/// Points `#id` links at the chapter that now holds the id.
pub struct LinkRepair;

impl Pass for LinkRepair {
    fn name(&self) -> &'static str {
        "link-repair"
    }

    fn apply(&self, chapter: &mut Chapter, ctx: &PassContext<'_>) -> Result<()> {
        let (xhtml, repaired) = repair_links(&chapter.xhtml, &chapter.href, ctx.targets)?;
        if repaired > 0 {
            debug!("{}: repaired {repaired} cross-chapter link(s)", chapter.id);
        }
        chapter.xhtml = xhtml;
        Ok(())
    }
}

/// Sets `lang`, `xml:lang` and `dir`.
pub struct Language;

impl Pass for Language {
    fn name(&self) -> &'static str {
        "language"
    }

    fn apply(&self, chapter: &mut Chapter, ctx: &PassContext<'_>) -> Result<()> {
        chapter.xhtml = apply_language(&chapter.xhtml, ctx.language)?;
        Ok(())
    }
}

/// Applies attribute-level accessibility fixes and counts them.
#[derive(Default)]
pub struct AccessibilityFix {
    fixes: Cell<usize>,
}

impl AccessibilityFix {
    pub fn fixes(&self) -> usize {
        self.fixes.get()
    }
}

impl Pass for AccessibilityFix {
    fn name(&self) -> &'static str {
        "accessibility"
    }

    fn apply(&self, chapter: &mut Chapter, ctx: &PassContext<'_>) -> Result<()> {
        let (xhtml, fixes) = fix_chapter(&chapter.xhtml, &ctx.config.accessibility)?;
        if fixes > 0 {
            debug!("{}: {fixes} accessibility fix(es)", chapter.id);
        }
        self.fixes.set(self.fixes.get() + fixes);
        chapter.xhtml = xhtml;
        Ok(())
    }
}

/// Verifies the chapter parses as XML.
pub struct WellFormed;

impl Pass for WellFormed {
    fn name(&self) -> &'static str {
        "well-formed"
    }

    fn apply(&self, chapter: &mut Chapter, _ctx: &PassContext<'_>) -> Result<()> {
        check_well_formed(&chapter.xhtml)
    }
}

/// Converts manuscripts into [`Book`]s.
///
/// ```
/// use quire::{ConvertConfig, Converter, Manuscript};
///
/// let manuscript = Manuscript::from_markdown("# One\n\nFirst.\n\n# Two\n\nSecond.\n")?;
/// let conversion = Converter::new()
///     .with_config(ConvertConfig::default().with_language("en"))
///     .convert(manuscript)?;
///
/// assert_eq!(conversion.book.chapters.len(), 2);
/// assert_eq!(conversion.book.toc[1].href, "chapter_002.xhtml#two");
/// # Ok::<(), quire::Error>(())
/// ```
pub struct Converter {
    config: ConvertConfig,
    /// Passes run after the built-in ones.
    extra_passes: Vec<Box<dyn Pass>>,
}

impl Converter {
    /// Create a converter with default configuration.
    pub fn new() -> Self {
        Self {
            config: ConvertConfig::default(),
            extra_passes: Vec::new(),
        }
    }

    /// Configure the converter with custom settings.
    pub fn with_config(mut self, config: ConvertConfig) -> Self {
        self.config = config;
        self
    }

    /// Run an additional pass after the built-in ones.
    pub fn with_pass(mut self, pass: impl Pass + 'static) -> Self {
        self.extra_passes.push(Box::new(pass));
        self
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Load a manuscript file and convert it.
    pub fn convert_path(&self, path: impl AsRef<Path>) -> Result<Conversion> {
        self.convert(Manuscript::from_path(path)?)
    }

    pub fn convert(&self, manuscript: Manuscript) -> Result<Conversion> {
        let config = &self.config;
        config.validate()?;

        // Normalizing first closes implied elements (`<p>intro<h1>`), so
        // chapter headings are seen at top level.
        let body = to_xhtml_fragment(&manuscript.body);
        let sections = split_chapters(&body, &config.split);
        if sections.is_empty() {
            return Err(Error::EmptyDocument);
        }
        debug!("split manuscript into {} section(s)", sections.len());

        let mut registry = IdRegistry::new();
        for section in &sections {
            reserve_existing_ids(&section.html, &mut registry);
        }

        let language = LanguageSettings::detect(
            config.language.as_deref().or(manuscript.language.as_deref()),
            &text_content(&manuscript.body),
        );

        let single = sections.len() == 1;
        let mut targets = LinkTargets::new();
        let mut chapters = Vec::with_capacity(sections.len());

        for (index, section) in sections.iter().enumerate() {
            let (body, headings) = inject_heading_ids(&section.html, &mut registry);
            let href = chapter_file_name(index);
            targets.add_chapter(&href, &body);

            let title = section
                .title
                .clone()
                .or_else(|| headings.iter().map(|h| h.title.clone()).find(|t| !t.is_empty()))
                .or_else(|| manuscript.title.clone().filter(|_| single))
                .unwrap_or_else(|| format!("Chapter {}", index + 1));

            let xhtml = wrap_chapter(
                &body,
                &title,
                language.language.as_deref(),
                config.stylesheet.as_deref(),
            );

            chapters.push(Chapter {
                id: chapter_id(index),
                href,
                title,
                headings,
                xhtml,
            });
        }

        let fix = AccessibilityFix::default();
        let mut passes: Vec<&dyn Pass> = vec![&LinkRepair, &Language, &fix, &WellFormed];
        for pass in &self.extra_passes {
            passes.push(&**pass);
        }

        let ctx = PassContext {
            config,
            language: &language,
            targets: &targets,
        };
        let mut warnings = Vec::new();
        for pass in passes {
            for chapter in &mut chapters {
                run_pass(pass, chapter, &ctx, &mut warnings);
            }
        }

        let mut report = audit(&chapters);
        report.fixes_applied = fix.fixes();

        let toc = build_toc(&chapters, config.toc_depth);

        let title = config
            .title
            .clone()
            .or_else(|| manuscript.title.clone())
            .or_else(|| chapters.first().map(|c| c.title.clone()))
            .unwrap_or_default();
        let mut metadata = Metadata::new(title).with_language(
            language
                .language
                .clone()
                .unwrap_or_else(|| UNDETERMINED_LANGUAGE.to_string()),
        );
        metadata.authors = config.authors.clone();
        metadata.identifier = config.identifier.clone().unwrap_or_default();

        let mut book = Book {
            metadata,
            chapters,
            toc,
        };
        book.metadata.accessibility =
            accessibility_metadata(&report, &book, config.accessibility.summary.as_deref());

        info!(
            "converted {:?}: {} chapter(s), {} TOC entries, {} accessibility issue(s), {} fix(es), {} warning(s)",
            book.metadata.title,
            book.chapters.len(),
            book.toc_len(),
            report.len(),
            report.fixes_applied,
            warnings.len()
        );

        Ok(Conversion {
            book,
            report,
            warnings,
        })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one pass on one chapter, restoring the chapter if it fails.
fn run_pass(pass: &dyn Pass, chapter: &mut Chapter, ctx: &PassContext<'_>, warnings: &mut Vec<PassWarning>) {
    let backup = chapter.xhtml.clone();
    if let Err(e) = pass.apply(chapter, ctx) {
        warn!("{} pass failed on {}: {e}", pass.name(), chapter.id);
        chapter.xhtml = backup;
        warnings.push(PassWarning {
            pass: pass.name().to_string(),
            chapter: chapter.id.clone(),
            message: e.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl Pass for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn apply(&self, chapter: &mut Chapter, _ctx: &PassContext<'_>) -> Result<()> {
            chapter.xhtml = "garbage".to_string();
            Err(Error::Rewrite("boom".to_string()))
        }
    }

    fn convert(body: &str, config: ConvertConfig) -> Conversion {
        Converter::new()
            .with_config(config)
            .convert(Manuscript::new(body))
            .unwrap()
    }

    #[test]
    fn test_chapter_naming() {
        let conversion = convert("<h1>A</h1><p>a</p><h1>B</h1><p>b</p>", ConvertConfig::default());
        let chapters = &conversion.book.chapters;
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].id, "chapter-001");
        assert_eq!(chapters[1].href, "chapter_002.xhtml");
        assert_eq!(chapters[1].title, "B");
        assert!(conversion.warnings.is_empty());
    }

    #[test]
    fn test_title_fallbacks() {
        let conversion = convert("<p>just text</p>", ConvertConfig::default());
        assert_eq!(conversion.book.chapters[0].title, "Chapter 1");

        let conversion = Converter::new()
            .convert(Manuscript::new("<p>just text</p>").with_title("Book"))
            .unwrap();
        assert_eq!(conversion.book.chapters[0].title, "Book");
        assert_eq!(conversion.book.metadata.title, "Book");
    }

    #[test]
    fn test_failing_pass_restores_chapter() {
        let conversion = Converter::new()
            .with_pass(Failing)
            .convert(Manuscript::new("<h1>A</h1><p>a</p>"))
            .unwrap();
        let chapter = &conversion.book.chapters[0];
        assert!(chapter.xhtml.contains("<h1 id=\"a\">A</h1>"));
        assert_eq!(conversion.warnings.len(), 1);
        assert_eq!(conversion.warnings[0].pass, "failing");
        assert_eq!(conversion.warnings[0].chapter, "chapter-001");
        assert!(conversion.warnings[0].to_string().contains("boom"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Converter::new()
            .with_config(ConvertConfig::default().with_split_level(9))
            .convert(Manuscript::new("<p>x</p>"));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_only_markers_is_empty() {
        let result = Converter::new().convert(Manuscript::new("<!-- pagebreak --><hr class=\"pagebreak\"/>"));
        assert!(matches!(result, Err(Error::EmptyDocument)));
    }

    #[test]
    fn test_metadata() {
        let config = ConvertConfig::default()
            .with_title("My Book")
            .with_author("A. Writer")
            .with_identifier("urn:isbn:9780000000000");
        let conversion = convert("<h1>One</h1><p>x</p>", config);
        let metadata = &conversion.book.metadata;
        assert_eq!(metadata.title, "My Book");
        assert_eq!(metadata.authors, vec!["A. Writer".to_string()]);
        assert_eq!(metadata.identifier, "urn:isbn:9780000000000");
        assert_eq!(metadata.language, "und");
        assert_eq!(metadata.accessibility_values("schema:accessibilityHazard"), vec!["none"]);
    }

    #[test]
    fn test_every_chapter_well_formed() {
        let conversion = convert(
            "<p>intro<h1>One</h1><p>a &nbsp; b<br><img src=x.png><h1>Two</h1><ul><li>x<li>y</ul>",
            ConvertConfig::default().with_language("en"),
        );
        assert!(conversion.warnings.is_empty(), "{:?}", conversion.warnings);
        let titles: Vec<_> = conversion.book.chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Front Matter", "One", "Two"]);
        for chapter in &conversion.book.chapters {
            check_well_formed(&chapter.xhtml).unwrap();
        }
    }
}
