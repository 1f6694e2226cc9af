// src/utils/html_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;
use crate::extractors::structure::Region;
use crate::pipeline::PageReport;
use crate::utils::error::AppError;

/// Escapes markup so snippets render as text
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn css_class(region: Region) -> &'static str {
    match region {
        Region::Header => "highlight-header",
        Region::Navigation => "highlight-navigation",
        Region::MainContent => "highlight-main",
        Region::Footer => "highlight-footer",
    }
}

/// Renders the detected regions and ads of a page as a standalone, colour-coded HTML file
pub fn render_debug_html(report: &PageReport) -> String {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n");

    // CSS for highlight colors
    debug_html.push_str("section { margin: 1em 0; padding: 0.5em; white-space: pre-wrap; font-family: monospace; }\n");
    debug_html.push_str(".highlight-header { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-navigation { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-main { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-footer { background-color: #FFA500; }\n");
    debug_html.push_str(".highlight-ad { background-color: #FFC0CB; }\n");
    debug_html.push_str(".missing { color: #888888; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    debug_html.push_str(&format!("<h1>{}</h1>\n", escape_html(&report.source_url)));

    for region in Region::ALL {
        let snippet = report.structure.region(region);
        let class = if report.structure.is_found(region) { css_class(region) } else { "missing" };
        debug_html.push_str(&format!(
            "<h2>{}</h2>\n<section class=\"{}\">{}</section>\n",
            region.label(),
            class,
            escape_html(snippet)
        ));
    }

    debug_html.push_str(&format!("<h2>ads ({})</h2>\n", report.structure.ads.len()));
    for (i, ad) in report.structure.ads.iter().enumerate() {
        debug_html.push_str(&format!(
            "<section class=\"highlight-ad\" title=\"Ad {}\">{}</section>\n",
            i + 1,
            escape_html(ad)
        ));
    }

    // Close the HTML document
    debug_html.push_str("\n</body>\n</html>");
    debug_html
}

/// Writes `render_debug_html` output to `filename`
pub fn create_debug_html(report: &PageReport, filename: &Path) -> Result<(), AppError> {
    let mut file = File::create(filename)?;
    file.write_all(render_debug_html(report).as_bytes())?;

    tracing::info!("Saved debug HTML to {}", filename.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::process_page;
    use url::Url;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn test_render_marks_found_and_missing_regions() {
        let url = Url::parse("https://example.com/").unwrap();
        let report = process_page(
            r#"<header>Top</header><main>Body</main><div class="banner">Ad</div>"#,
            &url,
        );
        let html = render_debug_html(&report);

        assert!(html.contains("<section class=\"highlight-header\">&lt;header&gt;Top&lt;/header&gt;</section>"));
        assert!(html.contains("<section class=\"highlight-main\">&lt;main&gt;Body&lt;/main&gt;</section>"));
        assert!(html.contains("<section class=\"missing\">Not found</section>"));
        assert!(html.contains("<h2>ads (1)</h2>"));
        assert!(html.contains("title=\"Ad 1\""));
    }

    #[test]
    fn test_create_debug_html_writes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("debug.html");
        let url = Url::parse("https://example.com/").unwrap();
        let report = process_page("<nav>Links</nav>", &url);

        create_debug_html(&report, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
        assert!(written.contains("highlight-navigation"));
    }
}
