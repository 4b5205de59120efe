//! Markup handling shared by every stage of the pipeline
//!
//! - scan: byte-offset tokenizer and element stack
//! - html: html5ever fragment parsing, entities, plain text, element lookup
//! - patterns: cached regexes

pub mod html;
pub mod patterns;
pub mod scan;

pub use html::{
    ElementSpan, collapse_whitespace, decode_entities, escape_xml, find_elements,
    find_first_element, first_heading_text, headings, is_xml_char, parse_fragment, text_content,
};
pub use scan::{Attribute, ElementStack, Scanner, Token, TokenKind, is_void_element};
