//! `lang`, `xml:lang` and `dir` attribute rewriting.

use lol_html::{RewriteStrSettings, element, rewrite_str};

use super::{Direction, LanguageSettings, normalize_language_tag};
use crate::error::Result;

/// Apply document language and direction to an XHTML chapter.
///
/// The root `<html>` gets `lang`/`xml:lang` from `settings` (and
/// `dir="rtl"` for right-to-left documents). Any element carrying only one
/// of `lang`/`xml:lang` gets the other, both normalized. An element whose
/// language runs in the opposite direction of the document gets an
/// explicit `dir` unless it already has one.
pub fn apply_language(xhtml: &str, settings: &LanguageSettings) -> Result<String> {
    let output = rewrite_str(
        xhtml,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", |el| {
                if el.tag_name() == "html" {
                    if let Some(lang) = &settings.language {
                        el.set_attribute("lang", lang)?;
                        el.set_attribute("xml:lang", lang)?;
                    } else {
                        mirror_language(el)?;
                    }
                    if settings.is_rtl() && !el.has_attribute("dir") {
                        el.set_attribute("dir", Direction::Rtl.as_str())?;
                    }
                    return Ok(());
                }

                let Some(lang) = mirror_language(el)? else {
                    return Ok(());
                };
                let direction = Direction::of_language(&lang);
                if direction != settings.direction && !el.has_attribute("dir") {
                    el.set_attribute("dir", direction.as_str())?;
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )?;

    Ok(output)
}

/// Make `lang` and `xml:lang` agree, returning the normalized language.
///
/// `lang` wins when both are present and disagree. Values that do not
/// normalize (`und`, empty) are left untouched.
fn mirror_language(
    el: &mut lol_html::html_content::Element<'_, '_>,
) -> std::result::Result<Option<String>, lol_html::errors::AttributeNameError> {
    let declared = el
        .get_attribute("lang")
        .or_else(|| el.get_attribute("xml:lang"));
    let Some(lang) = declared.as_deref().and_then(normalize_language_tag) else {
        return Ok(None);
    };

    if el.get_attribute("lang").as_deref() != Some(lang.as_str()) {
        el.set_attribute("lang", &lang)?;
    }
    if el.get_attribute("xml:lang").as_deref() != Some(lang.as_str()) {
        el.set_attribute("xml:lang", &lang)?;
    }
    Ok(Some(lang))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "<html xmlns=\"http://www.w3.org/1999/xhtml\"><head><title>T</title></head><body><p>x</p></body></html>";

    #[test]
    fn test_root_language() {
        let out = apply_language(DOC, &LanguageSettings::new(Some("en_gb"))).unwrap();
        assert!(out.contains(r#"lang="en-GB""#));
        assert!(out.contains(r#"xml:lang="en-GB""#));
        assert!(!out.contains("dir="));
    }

    #[test]
    fn test_rtl_document() {
        let out = apply_language(DOC, &LanguageSettings::new(Some("he"))).unwrap();
        assert!(out.contains(r#"dir="rtl""#));
        assert!(out.contains(r#"xml:lang="he""#));
    }

    #[test]
    fn test_existing_root_dir_kept() {
        let doc = DOC.replace("<html ", "<html dir=\"ltr\" ");
        let out = apply_language(&doc, &LanguageSettings::new(Some("ar"))).unwrap();
        assert!(out.contains(r#"dir="ltr""#));
        assert!(!out.contains(r#"dir="rtl""#));
    }

    #[test]
    fn test_unknown_language_mirrors_root() {
        let doc = DOC.replace("<html ", "<html lang=\"fr_ca\" ");
        let out = apply_language(&doc, &LanguageSettings::default()).unwrap();
        assert!(out.contains(r#"lang="fr-CA""#));
        assert!(out.contains(r#"xml:lang="fr-CA""#));
    }

    #[test]
    fn test_element_language_mirrored() {
        let doc = DOC.replace("<p>x</p>", r#"<p xml:lang="de">Hallo</p><span lang="ES">hola</span>"#);
        let out = apply_language(&doc, &LanguageSettings::new(Some("en"))).unwrap();
        assert!(out.contains(r#"<p xml:lang="de" lang="de">Hallo</p>"#));
        assert!(out.contains(r#"<span lang="es" xml:lang="es">hola</span>"#));
    }

    #[test]
    fn test_opposite_direction_gets_dir() {
        let doc = DOC.replace(
            "<p>x</p>",
            r#"<blockquote lang="he">שלום</blockquote><p lang="ar" dir="auto">x</p><p lang="fr">y</p>"#,
        );
        let out = apply_language(&doc, &LanguageSettings::new(Some("en"))).unwrap();
        assert!(out.contains(r#"<blockquote lang="he" xml:lang="he" dir="rtl">"#));
        assert!(out.contains(r#"dir="auto""#));
        assert!(out.contains(r#"<p lang="fr" xml:lang="fr">y</p>"#));

        let doc = DOC.replace("<p>x</p>", r#"<p lang="en">English</p>"#);
        let out = apply_language(&doc, &LanguageSettings::new(Some("ar"))).unwrap();
        assert!(out.contains(r#"<p lang="en" xml:lang="en" dir="ltr">"#));
    }

    #[test]
    fn test_self_closing_preserved() {
        let doc = DOC.replace("<p>x</p>", r#"<p>a<br/>b</p>"#);
        let out = apply_language(&doc, &LanguageSettings::new(Some("en"))).unwrap();
        assert!(out.contains("<br/>"));
    }
}
