// src/storage/mod.rs
use crate::pipeline::PageReport;
use crate::utils::error::StorageError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Default cap on the text part of a generated filename.
pub const DEFAULT_FILENAME_LEN: usize = 80;

// Characters rejected by at least one common filesystem
static UNSAFE_FILENAME_CHARS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[\\/:*?"<>|]"#).expect("Failed to compile UNSAFE_FILENAME_CHARS_RE")
});

static SEPARATOR_RUN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\s_]+").expect("Failed to compile SEPARATOR_RUN_RE")
});

/// Builds a filesystem-safe, 4-digit-indexed file stem from free text (a page title, a link text).
pub fn safe_filename(text: &str, index: usize, max_len: usize) -> String {
    let prefix = format!("{:04}", index);
    let text = text.trim();
    if text.is_empty() {
        return format!("{}_page", prefix);
    }

    let clean = UNSAFE_FILENAME_CHARS_RE.replace_all(text, "_");
    let clean = SEPARATOR_RUN_RE.replace_all(&clean, "_");
    let clean: String = clean.chars().take(max_len).collect();
    let clean = clean.trim_matches('_');

    if clean.is_empty() {
        prefix
    } else {
        format!("{}_{}", prefix, clean)
    }
}

/// The requested batch folder name, or a timestamped one when blank.
pub fn batch_folder_name(requested: &str) -> String {
    let requested = requested.trim();
    if requested.is_empty() {
        format!("extract_batch_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"))
    } else {
        requested.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolves `/base_dir/<folder>/`, creating it if needed
    pub fn folder_path(&self, folder: &str) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(folder);
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    /// Saves the page's markdown: the content-only view when a main region was found,
    /// the whole page otherwise.
    pub fn save_markdown(
        &self,
        folder: &str,
        stem: &str,
        report: &PageReport,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.folder_path(folder)?.join(format!("{}.md", stem));

        let markdown = if report.content_only_markdown.is_empty() {
            &report.markdown
        } else {
            &report.content_only_markdown
        };
        fs::write(&file_path, markdown).map_err(StorageError::IoError)?;

        tracing::info!("Saved markdown to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves the full page report (structure, links, metadata) as pretty JSON
    pub fn save_report(
        &self,
        folder: &str,
        stem: &str,
        report: &PageReport,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.folder_path(folder)?.join(format!("{}.json", stem));

        let report_str = serde_json::to_string_pretty(report)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, report_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved report to {}", file_path.display());
        Ok(file_path)
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::process_page;
    use url::Url;

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("", 3, DEFAULT_FILENAME_LEN), "0003_page");
        assert_eq!(safe_filename("   ", 3, DEFAULT_FILENAME_LEN), "0003_page");
        assert_eq!(safe_filename("a/b: c", 12, DEFAULT_FILENAME_LEN), "0012_a_b_c");
        assert_eq!(safe_filename("___", 1, DEFAULT_FILENAME_LEN), "0001");
        assert_eq!(safe_filename("What? <Why>", 7, DEFAULT_FILENAME_LEN), "0007_What_Why");
        assert_eq!(safe_filename("공지 사항", 10000, DEFAULT_FILENAME_LEN), "10000_공지_사항");
        assert_eq!(safe_filename("abcdef_", 2, 5), "0002_abcde");
        assert_eq!(safe_filename("abcd_ef", 2, 5), "0002_abcd");
    }

    #[test]
    fn test_batch_folder_name() {
        assert_eq!(batch_folder_name(" run1 "), "run1");
        let generated = batch_folder_name("");
        assert!(generated.starts_with("extract_batch_"));
        assert_eq!(generated.len(), "extract_batch_".len() + "YYYYmmdd_HHMMSS".len());
    }

    #[test]
    fn test_new_creates_base_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("nested").join("out");
        let storage = StorageManager::new(&base).unwrap();
        assert!(base.is_dir());
        assert_eq!(storage.base_dir(), base.as_path());
    }

    #[test]
    fn test_save_markdown_and_report() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();
        let url = Url::parse("https://example.com/post").unwrap();
        let report = process_page(
            "<html><head><title>Post</title></head><body><main><p>Body text</p></main></body></html>",
            &url,
        );

        let md_path = storage.save_markdown("batch", "0001_Post", &report).unwrap();
        let json_path = storage.save_report("batch", "0001_Post", &report).unwrap();

        assert_eq!(md_path, tmp.path().join("batch").join("0001_Post.md"));
        let markdown = fs::read_to_string(&md_path).unwrap();
        assert!(markdown.contains("Body text"));
        assert!(markdown.ends_with("[https://example.com/post](https://example.com/post)"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["source_url"], "https://example.com/post");
        assert_eq!(json["structure"]["header"], "Not found");
    }

    #[test]
    fn test_save_markdown_falls_back_to_whole_page() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();
        let url = Url::parse("https://example.com/").unwrap();
        let report = process_page("<p>Loose paragraph</p>", &url);
        assert!(report.content_only_markdown.is_empty());

        let md_path = storage.save_markdown("b", "0001_page", &report).unwrap();
        let markdown = fs::read_to_string(md_path).unwrap();
        assert!(markdown.contains("Loose paragraph"));
    }
}
