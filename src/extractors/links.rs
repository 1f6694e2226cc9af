// src/extractors/links.rs

// --- Imports ---
use crate::extractors::dom::visible_text;
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href]").expect("Failed to compile ANCHOR_SELECTOR")
});

const FILE_EXTENSIONS: [&str; 18] = [
    ".pdf", ".zip", ".rar", ".hwp", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".csv",
    ".png", ".jpg", ".jpeg", ".gif", ".mp3", ".mp4", ".avi",
];

const BOARD_URL_KEYWORDS: [&str; 8] = [
    "board", "forum", "bbs", "view", "article", "notice", "list.do", "view.do",
];

// bulletin board, notices, archive, list
const BOARD_TEXT_KEYWORDS: [&str; 4] = ["게시판", "공지사항", "자료실", "목록"];

// Hrefs with these schemes never lead to another page
const SKIPPED_SCHEMES: [&str; 4] = ["javascript:", "mailto:", "tel:", "data:"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkCategory {
    Standard,
    #[serde(rename = "File Download")]
    FileDownload,
    #[serde(rename = "Board/Forum")]
    BoardForum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkItem {
    pub href: String,
    pub text: String,
    pub category: LinkCategory,
    pub parent_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCollection {
    pub internal: Vec<LinkItem>,
    pub external: Vec<LinkItem>,
}

impl LinkCollection {
    pub fn len(&self) -> usize {
        self.internal.len() + self.external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parses a user-supplied URL, assuming `https://` when no http(s) scheme is given.
pub fn normalize_url(raw: &str) -> Result<Url, ExtractError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::EmptyUrl);
    }

    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    Url::parse(&candidate).map_err(|e| ExtractError::InvalidUrl(candidate, e))
}

/// Buckets a link by what it most likely points at. File extensions take precedence.
pub fn categorize_link(url: &str, text: &str) -> LinkCategory {
    let url_lower = url.to_lowercase();
    let text_lower = text.to_lowercase();

    let is_file = FILE_EXTENSIONS
        .iter()
        .any(|ext| url_lower.ends_with(ext) || url_lower.contains(&format!("{}?", ext)));
    if is_file {
        return LinkCategory::FileDownload;
    }

    let is_board = BOARD_URL_KEYWORDS.iter().any(|kw| url_lower.contains(kw))
        || BOARD_TEXT_KEYWORDS.iter().any(|kw| text_lower.contains(kw));
    if is_board {
        return LinkCategory::BoardForum;
    }

    LinkCategory::Standard
}

/// Collects the page's anchors, resolved against `page_url` and split by host.
/// The first occurrence of each resolved href wins.
pub fn collect_links(document: &Html, page_url: &Url) -> LinkCollection {
    let mut links = LinkCollection::default();
    let mut seen = HashSet::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(raw_href) = anchor.value().attr("href") else {
            continue;
        };
        let raw_href = raw_href.trim();
        if raw_href.is_empty() || raw_href.starts_with('#') {
            continue;
        }
        let lowered = raw_href.to_lowercase();
        if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
            continue;
        }

        let resolved = match page_url.join(raw_href) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("Skipping unresolvable href '{}': {}", raw_href, e);
                continue;
            }
        };

        let href = resolved.to_string();
        if !seen.insert(href.clone()) {
            continue;
        }

        let text = visible_text(anchor);
        let item = LinkItem {
            category: categorize_link(&href, &text),
            href,
            text,
            parent_url: page_url.to_string(),
        };

        if resolved.host_str() == page_url.host_str() {
            links.internal.push(item);
        } else {
            links.external.push(item);
        }
    }

    tracing::debug!(
        "Collected {} internal and {} external links from {}",
        links.internal.len(),
        links.external.len(),
        page_url
    );
    links
}
