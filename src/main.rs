// src/main.rs
use clap::Parser;
use page_extractor::extractors::normalize_url;
use page_extractor::pipeline::{self, BatchInput, BatchOptions, PageOutcome};
use page_extractor::storage::{batch_folder_name, StorageManager};
use page_extractor::utils::{self, AppError};
use std::path::PathBuf;

/// Command Line Interface for the page structure extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// HTML files to analyze
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Source URL of the page, used for citations and link resolution
    /// (defaults to the file:// URL of each input)
    #[arg(short, long)]
    url: Option<String>,

    /// Output directory for extracted content
    #[arg(short, long, env = "PAGE_EXTRACTOR_OUTPUT_DIR", default_value = "./output")]
    output_dir: PathBuf,

    /// Batch folder name inside the output directory (defaults to a timestamped name)
    #[arg(short, long, default_value = "")]
    folder_name: String,

    /// Number of pages analyzed in parallel
    #[arg(short = 'j', long, default_value_t = 4)]
    concurrency: usize,

    /// Debug mode - save an annotated HTML file per page showing the detected regions
    #[arg(short, long)]
    debug: bool,

    /// Print each page structure as JSON to stdout
    #[arg(long)]
    print: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    if args.concurrency == 0 {
        return Err(AppError::Config("--concurrency must be at least 1".to_string()));
    }

    // 3. One source URL applies to every input; it only makes sense for a single page
    let source_url = args.url.as_deref().map(normalize_url).transpose()?;
    if source_url.is_some() && args.inputs.len() > 1 {
        tracing::warn!("--url given for {} inputs; all of them will cite the same URL", args.inputs.len());
    }

    // 4. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;
    let options = BatchOptions {
        folder: batch_folder_name(&args.folder_name),
        concurrency: args.concurrency,
        debug: args.debug,
    };

    let inputs = args
        .inputs
        .iter()
        .map(|path| BatchInput { path: path.clone(), source_url: source_url.clone() })
        .collect();

    // 5. Analyze and save every page
    let summary = pipeline::process_batch(&storage, inputs, &options).await?;

    if args.print {
        for outcome in &summary.outcomes {
            if let PageOutcome::Saved(saved) = outcome {
                let json = serde_json::to_string_pretty(&saved.structure)
                    .map_err(|e| AppError::Processing(e.to_string()))?;
                println!("{}", json);
            }
        }
    }

    tracing::info!(
        "Processing finished. Success: {}, Failures: {}. Output folder: {}",
        summary.success_count(),
        summary.failure_count(),
        summary.folder.display()
    );

    if summary.success_count() == 0 && summary.failure_count() > 0 {
        return Err(AppError::Processing(format!(
            "Failed to analyze any of the {} input page(s)",
            summary.failure_count()
        )));
    }

    Ok(())
}
