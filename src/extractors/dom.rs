// src/extractors/dom.rs

// --- Imports ---
use scraper::{node::Node, ElementRef};

// --- Constants ---
/// Appended to any snippet cut short by `truncate_with_marker` / `clip_with_marker`.
pub const TRUNCATION_MARKER: &str = "...";

// Elements whose text content never renders
const NON_VISIBLE_TAGS: [&str; 3] = ["script", "style", "template"];

/// Rendered text of an element: text nodes in document order, each trimmed with inner
/// whitespace runs collapsed to a single space, concatenated without separator.
pub fn visible_text(element: ElementRef) -> String {
    let mut text = String::new();

    for node in element.descendants() {
        let Node::Text(text_node) = node.value() else {
            continue;
        };
        // Skip text under a non-rendered container, up to and including `element` itself
        let mut hidden = false;
        for ancestor in node.ancestors() {
            if let Some(el) = ancestor.value().as_element() {
                if NON_VISIBLE_TAGS.contains(&el.name()) {
                    hidden = true;
                    break;
                }
            }
            if ancestor.id() == element.id() {
                break;
            }
        }
        if hidden {
            continue;
        }

        let mut words = text_node.text.split_whitespace();
        if let Some(first) = words.next() {
            text.push_str(first);
            for word in words {
                text.push(' ');
                text.push_str(word);
            }
        }
    }

    text
}

/// Character count of `visible_text`, the score every region heuristic is built on.
pub fn visible_text_length(element: ElementRef) -> usize {
    visible_text(element).chars().count()
}

/// Case-insensitive substring test against the element's `id` attribute.
pub fn id_contains(element: ElementRef, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    element
        .value()
        .id()
        .is_some_and(|id| id.to_lowercase().contains(&keyword))
}

/// Case-insensitive substring test against each entry of the element's `class` list.
pub fn class_contains(element: ElementRef, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    element
        .value()
        .classes()
        .any(|class| class.to_lowercase().contains(&keyword))
}

const VOID_TAGS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Number of node levels in the subtree rooted at `element` (the element itself counts as 1).
pub fn subtree_depth(element: ElementRef) -> usize {
    let mut max_depth = 0;
    let mut stack = vec![(*element, 1_usize)];

    while let Some((node, depth)) = stack.pop() {
        max_depth = max_depth.max(depth);
        for child in node.children() {
            stack.push((child, depth + 1));
        }
    }

    max_depth
}

/// Serializes `element` without the subtrees of any tag in `skipped_tags`.
/// Comments and doctypes are dropped. Walks with an explicit stack, so nesting depth is unbounded.
pub fn pruned_markup(element: ElementRef, skipped_tags: &[&str]) -> String {
    let mut markup = String::new();
    // (node, closing): `true` entries emit the end tag once the children are written
    let mut stack = vec![(*element, false)];

    while let Some((node, closing)) = stack.pop() {
        match node.value() {
            Node::Element(el) if closing => {
                markup.push_str("</");
                markup.push_str(el.name());
                markup.push('>');
            }
            Node::Element(el) => {
                let name = el.name();
                if skipped_tags.contains(&name) {
                    continue;
                }

                markup.push('<');
                markup.push_str(name);
                for (attr, value) in el.attrs() {
                    markup.push(' ');
                    markup.push_str(attr);
                    markup.push_str("=\"");
                    push_escaped(&mut markup, value, true);
                    markup.push('"');
                }
                markup.push('>');

                if VOID_TAGS.contains(&name) {
                    continue;
                }
                stack.push((node, true));
                let children: Vec<_> = node.children().collect();
                for child in children.into_iter().rev() {
                    stack.push((child, false));
                }
            }
            Node::Text(text_node) => push_escaped(&mut markup, &text_node.text, false),
            _ => {}
        }
    }

    markup
}

fn push_escaped(out: &mut String, text: &str, in_attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !in_attribute => out.push_str("&lt;"),
            '>' if !in_attribute => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Cuts `text` to `cap` characters and appends the marker, or returns it verbatim when it fits.
pub fn truncate_with_marker(text: &str, cap: usize) -> String {
    match text.char_indices().nth(cap) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Like `truncate_with_marker`, but the marker is appended unconditionally (ad snippets).
pub fn clip_with_marker(text: &str, cap: usize) -> String {
    let end = text
        .char_indices()
        .nth(cap)
        .map_or(text.len(), |(byte_idx, _)| byte_idx);
    format!("{}{}", &text[..end], TRUNCATION_MARKER)
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first<'a>(doc: &'a Html, css: &str) -> ElementRef<'a> {
        let selector = Selector::parse(css).unwrap();
        doc.select(&selector).next().unwrap()
    }

    #[test]
    fn test_visible_text_collapses_whitespace_and_skips_scripts() {
        let doc = Html::parse_document(
            r#"<div id="x">
                 <p>  Hello
                    world </p>
                 <script>var hidden = 1;</script>
                 <style>.a { color: red }</style>
                 <span>again</span>
               </div>"#,
        );
        let div = first(&doc, "#x");
        assert_eq!(visible_text(div), "Hello worldagain");
        assert_eq!(visible_text_length(div), 16);
    }

    #[test]
    fn test_visible_text_of_empty_element() {
        let doc = Html::parse_document("<div id='x'>   \n  <br/> </div>");
        assert_eq!(visible_text_length(first(&doc, "#x")), 0);
    }

    #[test]
    fn test_visible_text_counts_chars_not_bytes() {
        let doc = Html::parse_document("<p id='k'>공지사항</p>");
        assert_eq!(visible_text_length(first(&doc, "#k")), 4);
    }

    #[test]
    fn test_attribute_predicates_are_case_insensitive() {
        let doc = Html::parse_document(
            r#"<div id="TopBar" class="Site-Header wide">x</div><p class="plain">y</p>"#,
        );
        let div = first(&doc, "div");
        let p = first(&doc, "p");

        assert!(id_contains(div, "top"));
        assert!(class_contains(div, "header"));
        assert!(class_contains(div, "HEAD"));
        assert!(!class_contains(div, "footer"));
        assert!(!id_contains(p, "plain"), "p has no id");
        assert!(class_contains(p, "lai"));
    }

    #[test]
    fn test_subtree_depth() {
        let doc = Html::parse_document("<div id='x'><p><b>deep</b></p><span>shallow</span></div>");
        // div > p > b > text
        assert_eq!(subtree_depth(first(&doc, "#x")), 4);

        let nested = format!("<div id='n'>{}x{}</div>", "<div>".repeat(3000), "</div>".repeat(3000));
        let doc = Html::parse_document(&nested);
        assert_eq!(subtree_depth(first(&doc, "#n")), 3002);
    }

    #[test]
    fn test_pruned_markup_drops_hidden_subtrees() {
        let doc = Html::parse_document(
            r#"<div id="x" title="a &quot;q&quot;"><p>1 &lt; 2</p><script>var s = 1;</script><!-- note --><br><style>.a{}</style><noscript>enable js</noscript></div>"#,
        );
        let markup = pruned_markup(first(&doc, "#x"), &["script", "style", "noscript"]);
        assert_eq!(markup, r#"<div id="x" title="a &quot;q&quot;"><p>1 &lt; 2</p><br></div>"#);
    }

    #[test]
    fn test_pruned_markup_handles_deep_nesting() {
        let nested = format!(
            "<div id='n'>{}x{}</div>",
            "<span>".repeat(5000),
            "</span>".repeat(5000)
        );
        let doc = Html::parse_document(&nested);
        let markup = pruned_markup(first(&doc, "#n"), &[]);
        assert!(markup.starts_with("<div id=\"n\"><span><span>"));
        assert!(markup.contains(">x<"));
        assert_eq!(markup.matches("</span>").count(), 5000);
    }

    #[test]
    fn test_truncate_with_marker() {
        assert_eq!(truncate_with_marker("abcdef", 6), "abcdef");
        assert_eq!(truncate_with_marker("abcdef", 10), "abcdef");
        assert_eq!(truncate_with_marker("abcdef", 3), "abc...");
        assert_eq!(truncate_with_marker("가나다라", 2), "가나...");
    }

    #[test]
    fn test_clip_with_marker_always_marks() {
        assert_eq!(clip_with_marker("abc", 200), "abc...");
        assert_eq!(clip_with_marker("abcdef", 4), "abcd...");
    }
}
