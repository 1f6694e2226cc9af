// src/extractors/content.rs

// --- Imports ---
use crate::extractors::dom::{pruned_markup, subtree_depth, visible_text};
use html2md::parse_html;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title").expect("Failed to compile TITLE_SELECTOR")
});

const CITATION_LABEL: &str = "출처(Citations):";

// Subtrees never rendered as markdown text
const MARKDOWN_SKIPPED_TAGS: [&str; 5] = ["head", "script", "style", "template", "noscript"];

/// Deepest subtree handed to the markdown converter, which recurses once per level.
/// Anything deeper is rendered as plain visible text.
pub const MAX_MARKDOWN_DEPTH: usize = 128;

/// The main-content element on its own, as markup and as markdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentView {
    pub html: String,
    pub markdown: String,
}

impl ContentView {
    pub fn from_element(main_element: ElementRef) -> Self {
        Self {
            html: main_element.html(),
            markdown: element_markdown(main_element),
        }
    }

    pub fn from_html(main_html: &str) -> Self {
        Self {
            html: main_html.to_string(),
            markdown: html_to_markdown(main_html),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

/// Markdown rendering with links and images kept.
pub fn html_to_markdown(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    element_markdown(fragment.root_element())
}

/// Markdown rendering of a whole page, `<head>` excluded.
pub fn page_markdown(document: &Html) -> String {
    element_markdown(document.root_element())
}

/// Markdown of an element's rendered content: script, style and similar subtrees are
/// dropped before conversion.
pub fn element_markdown(element: ElementRef) -> String {
    let depth = subtree_depth(element);
    if depth > MAX_MARKDOWN_DEPTH {
        tracing::warn!(
            "Markup nested {} levels deep (limit {}), using plain text instead of markdown",
            depth,
            MAX_MARKDOWN_DEPTH
        );
        return visible_text(element);
    }
    parse_html(&pruned_markup(element, &MARKDOWN_SKIPPED_TAGS))
}

/// Text of the first `<title>`, if it has any.
pub fn page_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(visible_text)
        .filter(|title| !title.is_empty())
}

pub fn markdown_citation(source_url: &str) -> String {
    format!("\n\n---\n**{}** [{}]({})", CITATION_LABEL, source_url, source_url)
}

pub fn html_citation(source_url: &str) -> String {
    format!(
        "<br><hr><p><strong>{}</strong> <a href='{}'>{}</a></p>",
        CITATION_LABEL, source_url, source_url
    )
}

/// Appends `citation` to a non-empty body; an empty body stays empty.
pub fn with_citation(body: &str, citation: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!("{}{}", body, citation)
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::structure::extract;

    #[test]
    fn test_content_view_from_main_element() {
        let document = Html::parse_document(
            r#"<html><body><nav>Menu</nav>
               <main><p>Hello <a href="https://example.com/a">there</a></p></main>
               </body></html>"#,
        );
        let (_, main) = extract(&document);
        let view = ContentView::from_element(main.unwrap());

        assert!(view.html.starts_with("<main>"));
        assert!(!view.html.contains("Menu"));
        assert!(view.markdown.contains("Hello"));
        assert!(view.markdown.contains("(https://example.com/a)"));
        assert!(!view.markdown.contains("Menu"));
    }

    #[test]
    fn test_page_markdown_excludes_scripts_and_styles() {
        let document = Html::parse_document(
            r#"<html><head><title>T</title><script>var secret=1;</script><style>.a{}</style></head>
               <body><main>Hi <script>track("x");</script><noscript>enable js</noscript></main></body></html>"#,
        );
        let markdown = page_markdown(&document);

        assert!(markdown.contains("Hi"));
        assert!(!markdown.contains("secret"));
        assert!(!markdown.contains(".a{}"));
        assert!(!markdown.contains("track"));
        assert!(!markdown.contains("enable js"));
        assert!(!html_to_markdown("<p>ok</p><script>var secret=1;</script>").contains("secret"));
    }

    #[test]
    fn test_deeply_nested_markup_falls_back_to_text() {
        let html = format!(
            "<div class='content'>{}x{}</div>",
            "<div>".repeat(2000),
            "</div>".repeat(2000)
        );
        let document = Html::parse_document(&html);
        assert_eq!(page_markdown(&document), "x");
        assert_eq!(html_to_markdown(&html), "x");

        let shallow = format!("{}y{}", "<div>".repeat(20), "</div>".repeat(20));
        assert_eq!(html_to_markdown(&shallow).trim(), "y");
    }

    #[test]
    fn test_page_title() {
        let document = Html::parse_document("<html><head><title>  My\n Page </title></head></html>");
        assert_eq!(page_title(&document), Some("My Page".to_string()));

        let untitled = Html::parse_document("<html><head><title> </title></head></html>");
        assert_eq!(page_title(&untitled), None);
    }

    #[test]
    fn test_citations() {
        assert_eq!(
            markdown_citation("https://a.b/c"),
            "\n\n---\n**출처(Citations):** [https://a.b/c](https://a.b/c)"
        );
        assert_eq!(
            html_citation("https://a.b/c"),
            "<br><hr><p><strong>출처(Citations):</strong> <a href='https://a.b/c'>https://a.b/c</a></p>"
        );
    }

    #[test]
    fn test_with_citation_leaves_empty_body_empty() {
        assert_eq!(with_citation("", "\n--"), "");
        assert_eq!(with_citation("body", "\n--"), "body\n--");
    }
}
