use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use catalog_indexer::{Dependencies, IndexerConfig, IndexingError, RunSummary};
use catalog_indexer_pipeline::{FailurePolicy, IndexMode};

/// Exit code when the run finished but some records failed or were rejected.
const EXIT_PARTIAL: u8 = 2;

/// Exit code after an interrupt.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(name = "catalog-indexer")]
#[command(about = "Build the product search index from the product catalog", long_about = None)]
struct Cli {
    /// Product catalog file (overrides PRODUCT_CATALOG_PATH)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Target index name (overrides PRODUCT_INDEX_NAME)
    #[arg(long)]
    index_name: Option<String>,

    /// Records embedded at the same time (overrides INDEXER_CONCURRENCY)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Keep going when a record fails and report failures at the end
    #[arg(long)]
    collect_errors: bool,

    /// Create the index only if it is missing instead of rebuilding it
    #[arg(long)]
    ensure_only: bool,

    /// Build documents without touching the index and print a JSON summary
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn apply(&self, config: &mut IndexerConfig) {
        if let Some(catalog) = &self.catalog {
            config.catalog_path = catalog.clone();
        }
        if let Some(index_name) = &self.index_name {
            config.index_name = index_name.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if self.collect_errors {
            config.failure_policy = FailurePolicy::CollectErrors;
        }
        if self.ensure_only {
            config.index_mode = IndexMode::Ensure;
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // stdout carries the run summary only
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn run(
    cli: &Cli,
    config: Result<IndexerConfig, IndexingError>,
) -> Result<RunSummary, IndexingError> {
    let mut config = config?;
    cli.apply(&mut config);
    debug!(?config, "Loaded configuration");

    let deps = Dependencies::new(&config)?;

    if cli.dry_run {
        info!(catalog = %config.catalog_path.display(), "Dry run, index stage skipped");
        let outcome = deps.orchestrator.prepare(&config.catalog_path).await?;
        let summary = RunSummary::dry_run(&outcome);
        println!("{}", serde_json::to_string_pretty(&summary).map_err(std::io::Error::from)?);
        return Ok(summary);
    }

    let report = deps.orchestrator.run(&config.catalog_path).await?;
    let summary = RunSummary::from_report(&report);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary).map_err(std::io::Error::from)?);
    } else {
        print!("{}", summary);
    }
    Ok(summary)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Loads .env, so RUST_LOG and LOG_FORMAT from it reach the subscriber
    let config = IndexerConfig::from_env();
    init_tracing();

    tokio::select! {
        result = run(&cli, config) => match result {
            Ok(summary) if summary.is_clean() => ExitCode::SUCCESS,
            Ok(_) => {
                warn!("Run finished with failed or rejected documents");
                ExitCode::from(EXIT_PARTIAL)
            }
            Err(e) => {
                error!(error = %e, "Catalog indexer failed");
                eprintln!("Error: {}", e);

                let mut source = e.source();
                while let Some(err) = source {
                    eprintln!("  Caused by: {}", err);
                    source = err.source();
                }
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, index may be partially written");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}
