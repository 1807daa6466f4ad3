use anyhow::Result;
use clap::{Parser, Subcommand};
use lexindex::persist::{save_meta, save_state, IndexPaths, MetaFile, STATE_VERSION};
use lexindex::{RetrievalIndex, SearchHit, DEFAULT_LIMIT};
use tracing_subscriber::{EnvFilter, fmt};

use std::path::Path;

mod scan;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query a TF-IDF index over a project directory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a project directory and cache the idf + snippet state
    Build {
        /// Project directory to index
        #[arg(long)]
        input: String,
        /// Output index directory (state.json, meta.json)
        #[arg(long)]
        output: String,
    },
    /// Rebuild the index for a project directory and print the best matches
    Search {
        /// Project directory to index
        #[arg(long)]
        input: String,
        /// Free-text query
        #[arg(long)]
        query: String,
        /// Maximum number of results
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build_index(&input, &output),
        Commands::Search { input, query, limit } => search_project(&input, &query, limit),
    }
}

fn build_index(input: &str, output: &str) -> Result<()> {
    let docs = scan::collect_documents(Path::new(input))?;
    let index = RetrievalIndex::new();
    let stats = index.create_index(&docs);

    let out_paths = IndexPaths::new(output);
    save_state(&out_paths, &index.export_state())?;
    let meta = MetaFile {
        num_docs: stats.num_docs,
        num_vectorized: stats.num_vectorized,
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: STATE_VERSION,
    };
    save_meta(&out_paths, &meta)?;

    tracing::info!(output, num_terms = stats.num_terms, "index build complete");
    Ok(())
}

/// Vectors are never cached, so searching always starts from a fresh build.
fn rebuild_and_search(input: &str, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
    let docs = scan::collect_documents(Path::new(input))?;
    let index = RetrievalIndex::new();
    index.create_index(&docs);
    Ok(index.search(query, limit))
}

fn search_project(input: &str, query: &str, limit: usize) -> Result<()> {
    let hits = rebuild_and_search(input, query, limit)?;
    if hits.is_empty() {
        tracing::info!(query, "no matching files");
    }
    for hit in hits {
        println!("{}", serde_json::to_string(&hit)?);
    }
    Ok(())
}
