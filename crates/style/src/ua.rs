//! User-agent defaults for HTML elements.

use crate::model::Display;

/// Block-level HTML elements.
const BLOCK_LEVEL_ELEMENTS: &[&str] = &[
    "html",
    "body",
    "div",
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "menu",
    "dl",
    "dt",
    "dd",
    "blockquote",
    "pre",
    "form",
    "fieldset",
    "legend",
    "section",
    "article",
    "aside",
    "header",
    "footer",
    "main",
    "nav",
    "address",
    "figure",
    "figcaption",
    "details",
    "summary",
    "dialog",
    "hr",
];

/// Elements that never render.
const HIDDEN_ELEMENTS: &[&str] = &[
    "head", "script", "style", "template", "title", "meta", "link", "base", "noscript",
];

/// Default `display` for an HTML tag.
#[must_use]
pub fn default_display(tag: &str) -> Display {
    if HIDDEN_ELEMENTS.contains(&tag) {
        Display::None
    } else if tag == "li" {
        Display::ListItem
    } else if tag == "table" {
        Display::Table
    } else if tag == "slot" {
        Display::Contents
    } else if BLOCK_LEVEL_ELEMENTS.contains(&tag) {
        Display::Block
    } else {
        Display::Inline
    }
}
