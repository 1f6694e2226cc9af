// src/extractors/mod.rs
pub mod content;
pub mod dom;
pub mod links;
pub mod structure;

// Re-export key extraction types for convenience
pub use content::ContentView;
pub use links::{categorize_link, collect_links, normalize_url, LinkCategory, LinkCollection, LinkItem};
pub use structure::{
    analyze_structure, extract, PageStructure, Region, StructureAnalysis, StructureExtractor,
    NOT_FOUND,
};
