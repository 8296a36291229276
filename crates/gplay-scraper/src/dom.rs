//! Thin query layer over `scraper` with cheerio-like text semantics.
//!
//! Text of a selection is the concatenated text of every matched element,
//! and attributes are read from the first match. Queries target classes,
//! attributes and `itemprop` markers rather than tree position.

use scraper::{ElementRef, Html, Selector};

/// A parsed HTML page.
pub struct Document {
    html: Html,
}

impl Document {
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Parses a fragment, e.g. the reviews HTML carried inside a JSON reply.
    #[must_use]
    pub fn parse_fragment(html: &str) -> Self {
        Self {
            html: Html::parse_fragment(html),
        }
    }

    /// Scope covering the whole document.
    #[must_use]
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }
}

/// Parses a selector that is a compile-time constant.
fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid static selector")
}

pub(crate) fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    scope.select(&selector(css)).collect()
}

pub(crate) fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    scope.select(&selector(css)).next()
}

pub(crate) fn exists(scope: ElementRef<'_>, css: &str) -> bool {
    select_first(scope, css).is_some()
}

/// All text under `element`, untrimmed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text of every match concatenated, untrimmed. Empty when nothing matches.
pub(crate) fn text(scope: ElementRef<'_>, css: &str) -> String {
    select_all(scope, css)
        .into_iter()
        .map(element_text)
        .collect()
}

pub(crate) fn trimmed_text(scope: ElementRef<'_>, css: &str) -> String {
    text(scope, css).trim().to_owned()
}

pub(crate) fn attr(scope: ElementRef<'_>, css: &str, name: &str) -> Option<String> {
    select_first(scope, css)
        .and_then(|element| element.value().attr(name))
        .map(str::to_owned)
}

/// `name` attribute of every match that has one, in document order.
pub(crate) fn attrs(scope: ElementRef<'_>, css: &str, name: &str) -> Vec<String> {
    select_all(scope, css)
        .into_iter()
        .filter_map(|element| element.value().attr(name).map(str::to_owned))
        .collect()
}

/// Text directly owned by `element`, skipping every child element.
pub(crate) fn own_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
    out
}

/// The first element after `element` among its siblings.
pub(crate) fn next_element_sibling(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

pub(crate) fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Plain text of an HTML snippet with a newline kept at every paragraph end.
///
/// Plain text extraction would glue `<p>a</p><p>b</p>` into `"ab"`.
pub(crate) fn text_with_paragraph_breaks(inner_html: &str) -> String {
    let html = format!("<div>{}</div>", inner_html.replace("</p>", "\n</p>"));
    let fragment = Document::parse_fragment(&html);
    select_first(fragment.root(), "div")
        .map(element_text)
        .unwrap_or_default()
}
