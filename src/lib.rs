// src/lib.rs
//! Heuristic page-structure extraction for already-fetched HTML.
//!
//! [`extractors::structure`] locates the header, navigation, main content, footer and ad
//! regions of a page without site-specific configuration. The rest of the crate derives a
//! content-only view, collects links, and persists per-page reports.

pub mod extractors;
pub mod pipeline;
pub mod storage;
pub mod utils;

pub use extractors::{analyze_structure, extract, PageStructure, Region, StructureExtractor, NOT_FOUND};
pub use pipeline::{process_batch, process_page, PageReport};
pub use utils::AppError;
