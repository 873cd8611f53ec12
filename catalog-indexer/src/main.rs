use std::env;
use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;
use tracing::{error, info, Subscriber};
use tracing_subscriber::EnvFilter;

use catalog_indexer::cli::{Cli, Command};
use catalog_indexer::config::search_client;
use catalog_indexer::{Dependencies, IndexingError, SearchSettings, Settings};

fn subscriber() -> Box<dyn Subscriber + Send + Sync> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match env::var("LOG_FORMAT").as_deref() {
        Ok("json") => Box::new(
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .finish(),
        ),
        _ => Box::new(tracing_subscriber::fmt().with_env_filter(filter).finish()),
    }
}

async fn run_sync() -> Result<(), IndexingError> {
    let settings = Settings::from_env()?;
    let deps = Dependencies::new(settings).await?;

    info!(run_id = %deps.log.run_id(), "Starting catalog sync");
    let result = deps.orchestrator.run().await?;

    info!(
        succeeded = result.succeeded_count,
        failed = result.failed_items.len(),
        "Catalog sync complete"
    );
    if let Ok(summary) = serde_json::to_string(&result) {
        println!("{}", summary);
    }
    Ok(())
}

async fn run_search(index: &str, query: &str) -> Result<(), IndexingError> {
    let query: Value = serde_json::from_str(query)
        .map_err(|e| IndexingError::config(format!("--query is not valid JSON: {}", e)))?;

    let settings = SearchSettings::from_env()?;
    let client = search_client(&settings).await?;
    let hits = client.search(index, &query).await?;

    if hits.is_empty() {
        println!("No results found");
        return Ok(());
    }

    match serde_json::to_string_pretty(&hits) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => return Err(IndexingError::config(format!("Failed to render hits: {}", e))),
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let _guard = tracing::subscriber::set_default(subscriber());

    let result = match cli.command() {
        Command::Sync => run_sync().await,
        Command::Search { index, query } => run_search(&index, &query).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        // A failed run has already reported its error through the run log.
        Err(IndexingError::PipelineError(_)) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "Catalog indexer failed");
            ExitCode::FAILURE
        }
    }
}
