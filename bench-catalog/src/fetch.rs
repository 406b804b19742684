//! Benchmark dataset fetcher
//!
//! Downloads the rtabench table dumps (`<table>.csv.gz`) and unpacks them
//! to CSV for bulk loading. Downloads fan out concurrently; the first
//! failure aborts the batch.

use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use futures::future::try_join_all;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// Tables served as `<table>.csv.gz` by the rtabench dataset host
pub const RTABENCH_TABLES: [&str; 5] = [
    "customers",
    "products",
    "orders",
    "order_items",
    "order_events",
];

pub const DEFAULT_DATASET_BASE_URL: &str = "https://rtadatasets.timescale.com";

#[derive(Debug, Clone)]
pub struct DatasetFetcher {
    base_url: String,
    client: reqwest::Client,
}

impl Default for DatasetFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_DATASET_BASE_URL)
    }
}

impl DatasetFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Download and unpack all rtabench tables into `output_dir`
    ///
    /// # Errors
    /// Returns error if any destination `.csv` already exists (a partial
    /// re-run must be cleaned up explicitly, never clobbered), or when any
    /// download or decompression fails.
    pub async fn download_rtabench(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(output_dir)?;

        let downloads = RTABENCH_TABLES
            .iter()
            .map(|table| self.download_table(table, output_dir));

        try_join_all(downloads).await
    }

    /// Download one `<table>.csv.gz` and write `<table>.csv`
    pub async fn download_table(&self, table: &str, output_dir: &Path) -> Result<PathBuf> {
        let dest = output_dir.join(format!("{}.csv", table));

        if dest.exists() {
            return Err(Error::Internal(format!(
                "Already exists: {}",
                dest.display()
            )));
        }

        let url = format!("{}/{}.csv.gz", self.base_url, table);
        info!("Downloading {} to {}", url, dest.display());

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::HttpClient(format!(
                "Dataset host returned status {} for {}",
                response.status(),
                url
            )));
        }

        let compressed = response.bytes().await?;

        let mut decoder = GzDecoder::new(compressed.as_ref());
        let mut csv = Vec::new();
        decoder.read_to_end(&mut csv)?;

        fs::write(&dest, &csv)?;
        info!("Downloaded and extracted {}", dest.display());

        Ok(dest)
    }
}
