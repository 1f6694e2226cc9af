// src/pipeline.rs

// --- Imports ---
use crate::extractors::content::{
    html_citation, markdown_citation, page_markdown, page_title, with_citation, ContentView,
};
use crate::extractors::links::{collect_links, LinkCollection};
use crate::extractors::structure::{PageStructure, StructureExtractor};
use crate::storage::{safe_filename, StorageManager, DEFAULT_FILENAME_LEN};
use crate::utils::error::AppError;
use crate::utils::html_debug;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use url::Url;

// --- Data Structures ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub html_length: usize,
    pub extracted_at: String,
}

/// Everything derived from one HTML page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    pub source_url: String,
    pub title: Option<String>,
    /// The input page with the HTML citation footer appended.
    pub html: String,
    pub markdown: String,
    pub content_only_markdown: String,
    pub content_only_html: String,
    pub structure: PageStructure,
    pub links: LinkCollection,
    pub metadata: ReportMetadata,
}

/// Analyzes one page. Citations point at `source_url`, relative links resolve against it.
pub fn process_page(html: &str, source_url: &Url) -> PageReport {
    let document = Html::parse_document(html);
    let (structure, main_element) = StructureExtractor::new().extract(&document);

    let content = main_element.map(ContentView::from_element).unwrap_or_default();
    let source = source_url.as_str();
    let md_citation = markdown_citation(source);

    tracing::debug!(
        "Page {}: html {} bytes, content-only html {} bytes",
        source,
        html.len(),
        content.html.len()
    );

    PageReport {
        source_url: source.to_string(),
        title: page_title(&document),
        html: format!("{}{}", html, html_citation(source)),
        markdown: format!("{}{}", page_markdown(&document), md_citation),
        content_only_markdown: with_citation(&content.markdown, &md_citation),
        content_only_html: with_citation(&content.html, &html_citation(source)),
        structure,
        links: collect_links(&document, source_url),
        metadata: ReportMetadata {
            html_length: html.len(),
            extracted_at: chrono::Utc::now().to_rfc3339(),
        },
    }
}

// --- Batch Processing ---

#[derive(Debug, Clone)]
pub struct BatchInput {
    pub path: PathBuf,
    /// Overrides the `file://` URL derived from `path`.
    pub source_url: Option<Url>,
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub folder: String,
    pub concurrency: usize,
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedPage {
    pub input: PathBuf,
    pub markdown_path: PathBuf,
    pub report_path: PathBuf,
    pub debug_path: Option<PathBuf>,
    pub structure: PageStructure,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Saved(SavedPage),
    Failed { input: PathBuf, error: String },
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub folder: PathBuf,
    /// One entry per input, in input order.
    pub outcomes: Vec<PageOutcome>,
}

impl BatchSummary {
    pub fn success_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, PageOutcome::Saved(_)))
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }
}

/// Analyzes and saves every input, at most `options.concurrency` pages at a time.
/// A failing input is recorded in the summary and never stops the others.
pub async fn process_batch(
    storage: &StorageManager,
    inputs: Vec<BatchInput>,
    options: &BatchOptions,
) -> Result<BatchSummary, AppError> {
    let folder = storage.folder_path(&options.folder)?;
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let total = inputs.len();
    tracing::info!("Processing {} page(s) into {}", total, folder.display());

    let paths: Vec<PathBuf> = inputs.iter().map(|input| input.path.clone()).collect();
    let mut handles = Vec::with_capacity(total);

    for (idx, input) in inputs.into_iter().enumerate() {
        let index = idx + 1;
        let semaphore = Arc::clone(&semaphore);
        let storage = storage.clone();
        let options = options.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| AppError::Processing(e.to_string()))?;
            tracing::info!("[{}/{}] Processing {}", index, total, input.path.display());
            process_input(storage, input, index, options).await
        }));
    }

    // Handles run concurrently; awaiting them in order keeps outcomes in input order
    let mut outcomes = Vec::with_capacity(total);
    for (handle, input) in handles.into_iter().zip(paths) {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(AppError::from(e)),
        };
        match result {
            Ok(saved) => outcomes.push(PageOutcome::Saved(saved)),
            Err(e) => {
                tracing::error!("Failed to process {}: {}", input.display(), e);
                outcomes.push(PageOutcome::Failed { input, error: e.to_string() });
            }
        }
    }

    let summary = BatchSummary { folder, outcomes };
    tracing::info!(
        "Batch finished. Success: {}, Failures: {}",
        summary.success_count(),
        summary.failure_count()
    );
    Ok(summary)
}

async fn process_input(
    storage: StorageManager,
    input: BatchInput,
    index: usize,
    options: BatchOptions,
) -> Result<SavedPage, AppError> {
    let html = tokio::fs::read_to_string(&input.path).await?;
    tracing::debug!("Read {} bytes from {}", html.len(), input.path.display());

    let source_url = match input.source_url {
        Some(url) => url,
        None => file_url(&input.path).await?,
    };
    let fallback_name = input
        .path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    // scraper's Html is not Send: parse, analyze and save on one blocking thread
    let saved = tokio::task::spawn_blocking(move || -> Result<SavedPage, AppError> {
        let report = process_page(&html, &source_url);
        let name = report.title.as_deref().unwrap_or(&fallback_name);
        let stem = safe_filename(name, index, DEFAULT_FILENAME_LEN);

        let markdown_path = storage.save_markdown(&options.folder, &stem, &report)?;
        let report_path = storage.save_report(&options.folder, &stem, &report)?;
        let debug_path = if options.debug {
            let path = storage
                .folder_path(&options.folder)?
                .join(format!("{}_debug.html", stem));
            html_debug::create_debug_html(&report, &path)?;
            Some(path)
        } else {
            None
        };

        Ok(SavedPage {
            input: input.path,
            markdown_path,
            report_path,
            debug_path,
            structure: report.structure,
        })
    })
    .await??;

    Ok(saved)
}

async fn file_url(path: &Path) -> Result<Url, AppError> {
    let absolute = tokio::fs::canonicalize(path).await?;
    Url::from_file_path(&absolute).map_err(|_| {
        AppError::Config(format!("Cannot build a file URL for {}", absolute.display()))
    })
}
