// src/extractors/structure.rs

// --- Imports ---
use crate::extractors::dom::{
    class_contains, clip_with_marker, id_contains, truncate_with_marker, visible_text_length,
};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

// --- Constants ---
/// Stored in a `PageStructure` field when the region was not found.
pub const NOT_FOUND: &str = "Not found";

const REGION_SNIPPET_CAP: usize = 1000;
const MAIN_CONTENT_SNIPPET_CAP: usize = 2000;
const AD_SNIPPET_CAP: usize = 200;
const MAX_ADS: usize = 5;

// Keyword candidates with these tags get their score multiplied by CONTAINER_BONUS
const CONTAINER_TAGS: [&str; 3] = ["div", "section", "article"];
const CONTAINER_BONUS: f64 = 1.2;

// --- CSS Selectors (Lazy Static) ---
static ANY_ELEMENT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("*").expect("Failed to compile ANY_ELEMENT_SELECTOR")
});

static DIV_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div").expect("Failed to compile DIV_SELECTOR")
});

// Order matters: ads are reported selector by selector until MAX_ADS is reached
static AD_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        r#"iframe[src*="ads"]"#,
        r#"div[id*="ad-"]"#,
        r#"div[class*="ad-"]"#,
        r#"div[id*="banner"]"#,
        r#"div[class*="banner"]"#,
        ".adsbygoogle",
        r#"[class*="promotion"]"#,
        r#"[id*="promotion"]"#,
    ]
    .iter()
    .filter_map(|css| Selector::parse(css).ok())
    .collect()
});

// --- Data Structures ---

/// The four structural regions located by keyword/tag heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Header,
    Navigation,
    MainContent,
    Footer,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Header,
        Region::Navigation,
        Region::MainContent,
        Region::Footer,
    ];

    /// Semantic tags, in priority order. A match here skips the keyword pass.
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            Region::Header => &["header"],
            Region::Navigation => &["nav"],
            Region::MainContent => &["main", "article"],
            Region::Footer => &["footer"],
        }
    }

    /// Keywords looked for in `id` and `class` values, in collection order.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            // gnb: global navigation bar
            Region::Header => &["header", "top", "gnb", "head"],
            // lnb: local navigation bar
            Region::Navigation => &["nav", "menu", "lnb"],
            Region::MainContent => &["content", "main", "body", "center", "container", "wrapper"],
            Region::Footer => &["footer", "bottom", "info", "copyright"],
        }
    }

    pub fn snippet_cap(self) -> usize {
        match self {
            Region::MainContent => MAIN_CONTENT_SNIPPET_CAP,
            _ => REGION_SNIPPET_CAP,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Region::Header => "header",
            Region::Navigation => "navigation",
            Region::MainContent => "main_content",
            Region::Footer => "footer",
        }
    }
}

/// Truncated snippets of each detected region plus up to five ad snippets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStructure {
    pub header: String,
    pub navigation: String,
    pub main_content: String,
    pub footer: String,
    pub ads: Vec<String>,
}

impl Default for PageStructure {
    fn default() -> Self {
        Self {
            header: NOT_FOUND.to_string(),
            navigation: NOT_FOUND.to_string(),
            main_content: NOT_FOUND.to_string(),
            footer: NOT_FOUND.to_string(),
            ads: Vec::new(),
        }
    }
}

impl PageStructure {
    pub fn region(&self, region: Region) -> &str {
        match region {
            Region::Header => &self.header,
            Region::Navigation => &self.navigation,
            Region::MainContent => &self.main_content,
            Region::Footer => &self.footer,
        }
    }

    pub fn is_found(&self, region: Region) -> bool {
        self.region(region) != NOT_FOUND
    }

    fn set_region(&mut self, region: Region, snippet: String) {
        let slot = match region {
            Region::Header => &mut self.header,
            Region::Navigation => &mut self.navigation,
            Region::MainContent => &mut self.main_content,
            Region::Footer => &mut self.footer,
        };
        *slot = snippet;
    }
}

/// Owned result of `analyze_structure`, for callers that cannot keep the parsed document around.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureAnalysis {
    pub structure: PageStructure,
    /// Full, untruncated markup of the main-content element.
    pub main_html: Option<String>,
}

// --- Main Extractor Structure ---
#[derive(Debug, Default, Clone, Copy)]
pub struct StructureExtractor;

impl StructureExtractor {
    pub fn new() -> Self { Self {} }

    /// Locates header, navigation, main content, footer and ads in a parsed document.
    ///
    /// Never fails: missing regions are reported as `NOT_FOUND`. The second value is the
    /// full main-content element, borrowed from `document`, for content-only rendering.
    pub fn extract<'a>(&self, document: &'a Html) -> (PageStructure, Option<ElementRef<'a>>) {
        let mut structure = PageStructure::default();
        let mut main_element = None;

        for region in Region::ALL {
            let mut found = self.find_region(document, region);

            if found.is_none() && region == Region::MainContent {
                found = self.densest_div(document);
            }

            if let Some(element) = found {
                let snippet = truncate_with_marker(&element.html(), region.snippet_cap());
                tracing::debug!("Selected <{}> as {}", element.value().name(), region.label());
                structure.set_region(region, snippet);
                if region == Region::MainContent {
                    main_element = Some(element);
                }
            } else {
                tracing::debug!("No {} region found", region.label());
            }
        }

        structure.ads = self.find_ads(document);

        (structure, main_element)
    }

    /// Parses `html` and runs `extract`, returning owned results.
    pub fn analyze_structure(&self, html: &str) -> StructureAnalysis {
        let document = Html::parse_document(html);
        let (structure, main_element) = self.extract(&document);
        StructureAnalysis {
            structure,
            main_html: main_element.map(|element| element.html()),
        }
    }

    /// Tag pass, then keyword pass with scoring. No main-content fallback here.
    pub fn find_region<'a>(&self, document: &'a Html, region: Region) -> Option<ElementRef<'a>> {
        if let Some(element) = self.find_by_tags(document, region.tags()) {
            return Some(element);
        }

        let candidates = self.keyword_candidates(document, region.keywords());
        tracing::trace!("{} keyword candidates for {}", candidates.len(), region.label());
        self.best_scored(&candidates)
    }

    // First element, in document order, for the highest-priority tag that occurs at all.
    fn find_by_tags<'a>(&self, document: &'a Html, tags: &[&str]) -> Option<ElementRef<'a>> {
        tags.iter().find_map(|tag| {
            document
                .select(&ANY_ELEMENT_SELECTOR)
                .find(|element| element.value().name() == *tag)
        })
    }

    // Per keyword: id matches, then class matches. Duplicates across keywords are kept.
    fn keyword_candidates<'a>(&self, document: &'a Html, keywords: &[&str]) -> Vec<ElementRef<'a>> {
        let mut candidates = Vec::new();
        for keyword in keywords {
            candidates.extend(
                document
                    .select(&ANY_ELEMENT_SELECTOR)
                    .filter(|element| id_contains(*element, keyword)),
            );
            candidates.extend(
                document
                    .select(&ANY_ELEMENT_SELECTOR)
                    .filter(|element| class_contains(*element, keyword)),
            );
        }
        candidates
    }

    // Highest visible-text score wins; strict comparison keeps the first of equal scores.
    fn best_scored<'a>(&self, candidates: &[ElementRef<'a>]) -> Option<ElementRef<'a>> {
        let mut best_candidate = None;
        let mut max_score = 0.0_f64;

        for &element in candidates {
            let text_len = visible_text_length(element);
            if text_len == 0 {
                continue;
            }

            let mut score = text_len as f64;
            if CONTAINER_TAGS.contains(&element.value().name()) {
                score *= CONTAINER_BONUS;
            }
            tracing::trace!("Candidate <{}> scored {:.1}", element.value().name(), score);

            if score > max_score {
                max_score = score;
                best_candidate = Some(element);
            }
        }

        best_candidate
    }

    // Main-content fallback: the div carrying the most visible text.
    fn densest_div<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        let mut densest = None;
        let mut max_text_len = 0;

        for div in document.select(&DIV_SELECTOR) {
            let text_len = visible_text_length(div);
            if text_len > max_text_len {
                max_text_len = text_len;
                densest = Some(div);
            }
        }

        if densest.is_some() {
            tracing::debug!("Main content taken from densest div ({} chars)", max_text_len);
        }
        densest
    }

    fn find_ads(&self, document: &Html) -> Vec<String> {
        let mut found_ads = Vec::new();

        'selectors: for selector in AD_SELECTORS.iter() {
            for ad in document.select(selector) {
                found_ads.push(clip_with_marker(&ad.html(), AD_SNIPPET_CAP));
                if found_ads.len() >= MAX_ADS {
                    break 'selectors;
                }
            }
        }

        tracing::debug!("Found {} ad candidates", found_ads.len());
        found_ads
    }
}

/// Shorthand for `StructureExtractor::new().extract(document)`.
pub fn extract(document: &Html) -> (PageStructure, Option<ElementRef<'_>>) {
    StructureExtractor::new().extract(document)
}

/// Shorthand for `StructureExtractor::new().analyze_structure(html)`.
pub fn analyze_structure(html: &str) -> StructureAnalysis {
    StructureExtractor::new().analyze_structure(html)
}
