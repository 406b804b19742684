use bench_catalog::fetch::DatasetFetcher;
use std::path::Path;

/// Example: download the rtabench table dumps
///
/// Fetches the five `<table>.csv.gz` dumps from the dataset host and
/// unpacks them to CSV for bulk loading. Existing `.csv` files are
/// never overwritten; remove them first to re-download.
///
/// Usage:
///   cargo run --features remote --example fetch_rtabench
///
///   DATASET_BASE_URL=http://localhost:8080 DATA_DIR=./data \
///     cargo run --features remote --example fetch_rtabench
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bench_catalog=info".into()),
        )
        .init();

    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

    let fetcher = match std::env::var("DATASET_BASE_URL") {
        Ok(base_url) => DatasetFetcher::new(base_url),
        Err(_) => DatasetFetcher::default(),
    };

    let files = fetcher.download_rtabench(Path::new(&data_dir)).await?;

    println!("Downloaded {} tables:", files.len());
    for file in files {
        println!("  {}", file.display());
    }

    Ok(())
}
