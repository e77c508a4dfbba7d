//! Readable-text and link extraction from a rendered page snapshot

use crate::parsers::text::normalize_whitespace;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Elements that never carry documentation content
static NOISE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "script, style, noscript, nav, header, footer, \
         .sidebar, #sidebar, .side-bar, .sidenav, .toc-sidebar, \
         [role='navigation']",
    )
    .unwrap()
});

/// Main-content containers, most specific first
static CONTENT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "main",
        "article",
        "[role='main']",
        "#main-content",
        ".main-content",
        ".markdown-body",
        ".documentation",
        ".docs-content",
        ".doc-content",
        "#content",
        ".content",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Extracts cleaned visible text from the most specific content container.
///
/// Noise elements are skipped wherever they appear, including inside the
/// chosen container. Falls back to `<body>` and then to the whole document.
pub fn extract_main_text(html: &str) -> String {
    let doc = Html::parse_document(html);

    let root = find_content_root(&doc)
        .or_else(|| doc.select(&BODY_SELECTOR).next())
        .unwrap_or_else(|| doc.root_element());

    let mut text = String::new();
    collect_text(root, &mut text);

    normalize_whitespace(&text)
}

/// Returns the raw `href` of every anchor, in document order
pub fn extract_links(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);

    let links = doc
        .select(&LINK_SELECTOR)
        .filter_map(|e| e.value().attr("href"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<String>>();

    ::log::debug!("HTML parser found {} links", links.len());

    links
}

/// First match of the prioritized content selectors that is not noise
fn find_content_root(doc: &Html) -> Option<ElementRef<'_>> {
    CONTENT_SELECTORS.iter().find_map(|selector| {
        doc.select(selector).find(|element| !is_within_noise(element))
    })
}

fn is_within_noise(element: &ElementRef<'_>) -> bool {
    NOISE_SELECTOR.matches(element)
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| NOISE_SELECTOR.matches(&ancestor))
}

/// Elements whose content reads as a separate run of text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "div", "dl", "dt",
    "figcaption", "figure", "form", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main",
    "ol", "p", "pre", "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead",
    "tr", "ul",
];

fn is_block(element: &ElementRef<'_>) -> bool {
    BLOCK_ELEMENTS.contains(&element.value().name())
}

/// Inline text is joined as-is; block boundaries become a single space
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if NOISE_SELECTOR.matches(&child_element) {
                continue;
            }

            let block = is_block(&child_element);
            if block {
                out.push(' ');
            }
            collect_text(child_element, out);
            if block {
                out.push(' ');
            }
        }
    }
}
