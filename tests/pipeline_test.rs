//! End-to-end conversion tests.
//!
//! Each test converts a complete manuscript and checks the resulting
//! chapters, table of contents, metadata and accessibility report.

use std::io::Write;

use quire::export::check_well_formed;
use quire::{
    AccessibilityConfig, ConvertConfig, Converter, Error, IssueKind, Manuscript,
};
use tempfile::TempDir;

const LIGHTHOUSE_MD: &str = include_str!("fixtures/lighthouse.md");
const HEBREW_HTML: &str = include_str!("fixtures/hebrew.html");

fn convert_markdown(source: &str) -> quire::Conversion {
    let manuscript = Manuscript::from_markdown(source).unwrap();
    Converter::new()
        .with_config(ConvertConfig::default().with_language("en"))
        .convert(manuscript)
        .unwrap()
}

// ============================================================================
// Markdown Manuscripts
// ============================================================================

#[test]
fn test_markdown_chapters() {
    let conversion = convert_markdown(LIGHTHOUSE_MD);
    let book = &conversion.book;

    let titles: Vec<_> = book.chapters.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["The Lighthouse Keeper", "Chapter One: Arrival", "Chapter Two: Weather"]
    );
    assert_eq!(book.metadata.title, "The Lighthouse Keeper");
    assert_eq!(book.metadata.language, "en");
    assert!(conversion.warnings.is_empty(), "{:?}", conversion.warnings);

    for chapter in &book.chapters {
        check_well_formed(&chapter.xhtml).unwrap();
        assert!(chapter.xhtml.contains(r#"<html xmlns="http://www.w3.org/1999/xhtml""#));
        assert!(chapter.xhtml.contains(r#"xml:lang="en""#));
    }
}

#[test]
fn test_markdown_heading_ids_and_toc() {
    let book = convert_markdown(LIGHTHOUSE_MD).book;

    let ids: Vec<_> = book
        .chapters
        .iter()
        .flat_map(|c| c.headings.iter().map(|h| h.id.as_str()))
        .collect();
    assert_eq!(
        ids,
        vec![
            "the-lighthouse-keeper",
            "chapter-one-arrival",
            "the-harbor",
            "chapter-two-weather",
            "the-coast",
        ]
    );
    assert!(book.chapters[1].xhtml.contains(r#"<h2 id="the-harbor">The Harbor</h2>"#));

    assert_eq!(book.toc.len(), 3);
    assert_eq!(book.toc[0].href, "chapter_001.xhtml#the-lighthouse-keeper");
    assert!(book.toc[0].children.is_empty());
    assert_eq!(book.toc[1].children[0].title, "The Harbor");
    assert_eq!(book.toc[2].children[0].href, "chapter_003.xhtml#the-coast");
    assert_eq!(book.toc_len(), 5);
}

#[test]
fn test_markdown_cross_chapter_links() {
    let book = convert_markdown(LIGHTHOUSE_MD).book;

    let arrival = &book.chapters[1].xhtml;
    assert!(arrival.contains(r#"href="chapter_003.xhtml#the-coast""#));
    assert!(arrival.contains(r#"href="chapter_003.xhtml#fn-"#));

    let weather = &book.chapters[2].xhtml;
    assert!(weather.contains(r#"href="chapter_002.xhtml#fnref-"#));
    assert!(weather.contains(r#"role="doc-endnotes""#));
}

#[test]
fn test_markdown_page_break_and_code() {
    let book = convert_markdown(LIGHTHOUSE_MD).book;

    assert!(!book.chapters[0].xhtml.contains("pagebreak"));
    // The page-break command inside a code block is content.
    assert!(book.chapters[2].xhtml.contains("\\newpage"));
}

#[test]
fn test_markdown_accessibility() {
    let conversion = convert_markdown(LIGHTHOUSE_MD);
    let report = &conversion.report;

    assert_eq!(report.images, 1);
    assert_eq!(report.count(IssueKind::MissingAltText), 1);
    assert_eq!(report.count(IssueKind::VagueLinkText), 1);
    assert!(!report.has(IssueKind::HeadingSkip));
    assert!(!report.has(IssueKind::TableWithoutHeaders));
    assert!(report.fixes_applied >= 3);

    let table = &conversion.book.chapters[1].xhtml;
    assert!(table.contains(r#"<th scope="col">Pier</th>"#));

    let metadata = &conversion.book.metadata;
    assert_eq!(metadata.accessibility_values("schema:accessMode"), vec!["textual", "visual"]);
    let features = metadata.accessibility_values("schema:accessibilityFeature");
    assert!(features.contains(&"tableOfContents"));
    assert!(!features.contains(&"alternativeText"));
}

#[test]
fn test_decorative_images() {
    let manuscript = Manuscript::from_markdown(LIGHTHOUSE_MD).unwrap();
    let config = ConvertConfig::default()
        .with_language("en")
        .with_accessibility(AccessibilityConfig {
            decorative_images: true,
            ..AccessibilityConfig::default()
        });
    let conversion = Converter::new().with_config(config).convert(manuscript).unwrap();

    assert!(!conversion.report.has(IssueKind::MissingAltText));
    assert!(conversion.book.chapters[2].xhtml.contains(r#"role="presentation""#));
}

// ============================================================================
// HTML Manuscripts
// ============================================================================

#[test]
fn test_html_right_to_left() {
    let manuscript = Manuscript::from_html(HEBREW_HTML).unwrap();
    assert_eq!(manuscript.title.as_deref(), Some("ספר הבדיקה"));
    assert_eq!(manuscript.language.as_deref(), Some("he"));

    let conversion = Converter::new().convert(manuscript).unwrap();
    let book = &conversion.book;
    assert!(conversion.warnings.is_empty(), "{:?}", conversion.warnings);
    assert_eq!(book.metadata.language, "he");

    let titles: Vec<_> = book.chapters.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Front Matter", "פרק ראשון", "Chapter 3", "פרק שני"]);

    for chapter in &book.chapters {
        assert!(chapter.xhtml.contains(r#"dir="rtl""#));
        check_well_formed(&chapter.xhtml).unwrap();
    }
    assert!(book.chapters[1]
        .xhtml
        .contains(r#"<span lang="en" xml:lang="en" dir="ltr">"#));
}

#[test]
fn test_html_ids_links_and_audit() {
    let conversion = Converter::new()
        .convert(Manuscript::from_html(HEBREW_HTML).unwrap())
        .unwrap();
    let book = &conversion.book;

    assert_eq!(book.chapters[1].headings[0].id, "פרק-ראשון");
    assert_eq!(book.chapters[3].headings[0].id, "second");
    assert_eq!(
        book.toc[1].href,
        "chapter_002.xhtml#%D7%A4%D7%A8%D7%A7-%D7%A8%D7%90%D7%A9%D7%95%D7%9F"
    );

    assert!(book.chapters[1].xhtml.contains(r#"href="chapter_004.xhtml#intro-note""#));
    assert!(book.chapters[3].xhtml.contains(r#"role="doc-footnote""#));

    let tables: Vec<_> = conversion
        .report
        .issues
        .iter()
        .filter(|i| i.kind == IssueKind::TableWithoutHeaders)
        .collect();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].chapter, "chapter-004");
}

#[test]
fn test_print_page_markers_stay_in_place() {
    let body = concat!(
        r##"<h1>One</h1><p>Continued on <a href="#pg5">page five</a>.</p>"##,
        r#"<h1>Two</h1><p>a</p><span epub:type="pagebreak" class="pagebreak" id="pg5" title="5"></span><p>b</p>"#,
    );
    let conversion = Converter::new()
        .with_config(ConvertConfig::default().with_language("en"))
        .convert(Manuscript::new(body))
        .unwrap();
    let book = &conversion.book;

    assert_eq!(book.chapters.len(), 2);
    let second = &book.chapters[1].xhtml;
    assert!(second.contains(r#"id="pg5""#));
    assert!(second.contains(r#"role="doc-pagebreak""#));
    assert!(second.find("<p>a</p>") < second.find(r#"id="pg5""#));
    assert!(book.chapters[0].xhtml.contains(r#"href="chapter_002.xhtml#pg5""#));
    check_well_formed(second).unwrap();
}

#[test]
fn test_named_entities_in_titles_and_ids() {
    let manuscript = Manuscript::new("<h1>S&atilde;o Paulo</h1><p>&Oslash;resund &alpha; &eth;</p>");
    let book = Converter::new()
        .with_config(ConvertConfig::default().with_language("pt"))
        .convert(manuscript)
        .unwrap()
        .book;

    let chapter = &book.chapters[0];
    assert_eq!(chapter.title, "São Paulo");
    assert_eq!(chapter.headings[0].id, "sao-paulo");
    assert!(chapter.xhtml.contains("<p>Øresund α ð</p>"));
    assert!(!chapter.xhtml.contains("&amp;"));
}

#[test]
fn test_right_to_left_detected_without_language() {
    let manuscript = Manuscript::new("<h1>פרק</h1><p>טקסט בעברית ארוך</p>");
    assert_eq!(manuscript.language, None);

    let book = Converter::new().convert(manuscript).unwrap().book;
    assert_eq!(book.metadata.language, "und");
    assert_eq!(book.chapters.len(), 1);
    assert!(book.chapters[0].xhtml.contains(r#"dir="rtl""#));
    assert!(!book.chapters[0].xhtml.contains("xml:lang="));
}

#[test]
fn test_split_disabled_page_breaks() {
    let config = ConvertConfig::default().with_page_breaks(false);
    let conversion = Converter::new()
        .with_config(config)
        .convert(Manuscript::from_html(HEBREW_HTML).unwrap())
        .unwrap();
    assert_eq!(conversion.book.chapters.len(), 3);
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_convert_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.md");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(LIGHTHOUSE_MD.as_bytes()).unwrap();

    let conversion = Converter::new().convert_path(&path).unwrap();
    assert_eq!(conversion.book.chapters.len(), 3);
}

#[test]
fn test_convert_path_with_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("quire.json");
    std::fs::write(
        &config_path,
        r#"{ "split": { "level": 2 }, "toc_depth": 1, "title": "Keeper" }"#,
    )
    .unwrap();
    let book_path = dir.path().join("book.markdown");
    std::fs::write(&book_path, LIGHTHOUSE_MD).unwrap();

    let config = ConvertConfig::from_path(&config_path).unwrap();
    let conversion = Converter::new().with_config(config).convert_path(&book_path).unwrap();

    assert_eq!(conversion.book.chapters.len(), 5);
    assert_eq!(conversion.book.metadata.title, "Keeper");
    assert!(conversion.book.toc.iter().all(|e| e.children.is_empty()));
}

#[test]
fn test_word_documents_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.docx");
    std::fs::write(&path, b"PK\x03\x04").unwrap();

    let result = Converter::new().convert_path(&path);
    assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = Converter::new().convert_path(dir.path().join("absent.md"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_legacy_encoding() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("old.htm");
    std::fs::write(
        &path,
        b"<html><head><meta charset=\"iso-8859-1\"><title>Caf\xe9</title></head><body><h1>Caf\xe9</h1><p>x</p></body></html>",
    )
    .unwrap();

    let conversion = Converter::new().convert_path(&path).unwrap();
    assert_eq!(conversion.book.metadata.title, "Café");
    assert_eq!(conversion.book.chapters[0].headings[0].id, "cafe");
}
