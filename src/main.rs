use anyhow::{ensure, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use vismatch::{
    CatalogBuilder, CatalogFile, CatalogManager, ExtractorConfig, FeatureExtractor, ScoringMode,
    SearchParams, SearchService, SimilarityScorer, WeightTable,
};

/// Largest result count a search may ask for
const MAX_RESULTS_LIMIT: usize = 50;

/// Visual product matching from the command line
#[derive(Parser, Debug)]
#[command(name = "vismatch")]
#[command(about = "Find catalog products that look like an image", version, long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Longest image side used for feature extraction
    #[arg(long, global = true, default_value_t = vismatch_vision::MAX_DIMENSION)]
    max_dimension: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CatalogArg {
    /// Path to the catalog JSON file
    #[arg(long, env = "VISMATCH_CATALOG", default_value = "catalog.json")]
    catalog: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a catalog from a directory of product images
    Build {
        /// Root directory; first-level subdirectories become categories
        #[arg(long, env = "VISMATCH_IMAGE_DIR")]
        image_dir: PathBuf,
        #[command(flatten)]
        catalog: CatalogArg,
    },

    /// Re-extract every embedding of an existing catalog
    Regenerate {
        /// Directory the catalog's image paths are relative to
        #[arg(long, env = "VISMATCH_IMAGE_DIR")]
        image_dir: PathBuf,
        #[command(flatten)]
        catalog: CatalogArg,
        /// Write the result here instead of overwriting the catalog
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Rank catalog products by visual similarity to an image
    Search {
        /// Query image
        image: PathBuf,
        #[command(flatten)]
        catalog: CatalogArg,
        /// Minimum similarity score (0.0 - 1.0)
        #[arg(long, default_value_t = 0.0)]
        min_similarity: f32,
        /// Maximum number of results (1 - 50)
        #[arg(long, default_value_t = 10)]
        max_results: usize,
        /// Only consider products in this category
        #[arg(long)]
        category: Option<String>,
        /// Include the per-group score breakdown
        #[arg(long)]
        explain: bool,
        /// Plain cosine instead of the shape-weighted score
        #[arg(long)]
        cosine: bool,
    },

    /// Print the feature vector of an image
    Extract {
        image: PathBuf,
    },

    /// List categories with product counts
    Categories {
        #[command(flatten)]
        catalog: CatalogArg,
    },

    /// Show one product
    Show {
        product_id: String,
        #[command(flatten)]
        catalog: CatalogArg,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn search_params(min_similarity: f32, max_results: usize) -> anyhow::Result<SearchParams> {
    ensure!(
        (0.0..=1.0).contains(&min_similarity),
        "min-similarity must be between 0.0 and 1.0, got {}",
        min_similarity
    );
    ensure!(
        (1..=MAX_RESULTS_LIMIT).contains(&max_results),
        "max-results must be between 1 and {}, got {}",
        MAX_RESULTS_LIMIT,
        max_results
    );
    Ok(SearchParams::new(min_similarity, max_results))
}

fn open_service(catalog: &Path, extractor: FeatureExtractor, scorer: SimilarityScorer) -> anyhow::Result<SearchService> {
    let manager = CatalogManager::open(catalog)
        .with_context(|| format!("Failed to open catalog {}", catalog.display()))?;
    Ok(SearchService::new(extractor, scorer, Arc::new(manager)))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries JSON results, logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let extractor = FeatureExtractor::new(ExtractorConfig {
        max_dimension: cli.max_dimension,
    });

    match cli.command {
        Command::Build { image_dir, catalog } => {
            info!("Building catalog from {:?}", image_dir);
            let builder = CatalogBuilder::new(extractor);
            let (mut file, report) = builder.scan_directory(&image_dir)?;
            file.save(&catalog.catalog)?;
            print_json(&report)?;
        }
        Command::Regenerate {
            image_dir,
            catalog,
            output,
        } => {
            // other layouts and stale checksums are exactly what regeneration replaces
            let file = CatalogFile::read(&catalog.catalog)?;
            let builder = CatalogBuilder::new(extractor);
            let (mut regenerated, report) = builder.regenerate(&file, &image_dir);
            regenerated.save(output.as_ref().unwrap_or(&catalog.catalog))?;
            print_json(&report)?;
        }
        Command::Search {
            image,
            catalog,
            min_similarity,
            max_results,
            category,
            explain,
            cosine,
        } => {
            let params = search_params(min_similarity, max_results)?;
            let scorer = if cosine {
                SimilarityScorer::new(WeightTable::uniform(), ScoringMode::Cosine)
            } else {
                SimilarityScorer::weighted()
            };
            let service = open_service(&catalog.catalog, extractor, scorer)?.with_explanations(explain);
            let response = service
                .search_path(&image, &params, category.as_deref())
                .with_context(|| format!("Failed to process image {}", image.display()))?;
            print_json(&response)?;
        }
        Command::Extract { image } => {
            let vector = extractor
                .extract_path(&image)
                .with_context(|| format!("Failed to process image {}", image.display()))?;
            print_json(&vector)?;
        }
        Command::Categories { catalog } => {
            let service = open_service(&catalog.catalog, extractor, SimilarityScorer::weighted())?;
            print_json(&service.status())?;
        }
        Command::Show { product_id, catalog } => {
            let service = open_service(&catalog.catalog, extractor, SimilarityScorer::weighted())?;
            let product = service
                .product(&product_id)
                .with_context(|| format!("Product {} not found", product_id))?;
            print_json(&product)?;
        }
    }

    Ok(())
}
