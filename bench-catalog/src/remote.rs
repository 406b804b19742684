//! Corpus registry HTTP client
//!
//! This module provides a client for a corpus registry serving the same
//! layout as the on-disk corpus over plain HTTP: JSON listings for suites
//! and queries, raw text for the SQL files themselves.

use crate::error::{Error, Result};
use crate::provider::CorpusProvider;
use async_trait::async_trait;
use serde::Deserialize;
use sql_corpus::{Engine, QueryId, SuiteManifest};

/// Directory segment for suite-default variants
const COMMON_DIR: &str = "common";

/// HTTP client for a corpus registry
///
/// # Example
/// ```no_run
/// use bench_catalog::remote::CorpusRegistryClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = CorpusRegistryClient::new("http://localhost:9000");
/// let suites = client.list_suites().await?;
/// println!("Available suites: {:?}", suites);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CorpusRegistryClient {
    base_url: String,
    client: reqwest::Client,
}

/// Response from `/suites`
#[derive(Debug, Deserialize)]
pub struct SuitesResponse {
    pub suites: Vec<String>,
}

/// Response from `/suites/{suite}/queries/{dir}`
#[derive(Debug, Deserialize)]
pub struct QueriesResponse {
    pub queries: Vec<String>,
}

/// Response from `/suites/{suite}/schemas`
#[derive(Debug, Deserialize)]
pub struct SchemasResponse {
    pub engines: Vec<String>,
}

impl CorpusRegistryClient {
    /// Create a new registry client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the registry (e.g., "http://localhost:9000")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// List all suites in the registry
    ///
    /// # Errors
    /// Returns error if the request fails, the registry returns a non-2xx
    /// status, or the response is not valid JSON
    pub async fn list_suites(&self) -> Result<Vec<String>> {
        let url = format!("{}/suites", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::HttpClient(format!(
                "Registry returned status {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let suites_response: SuitesResponse = response.json().await?;
        Ok(suites_response.suites)
    }

    /// List query stems in one directory of a suite
    ///
    /// # Arguments
    /// * `suite` - Suite name
    /// * `dir` - Engine directory name, or `"common"`
    ///
    /// # Returns
    /// `None` when the registry has no such directory (404)
    pub async fn list_queries(&self, suite: &str, dir: &str) -> Result<Option<Vec<String>>> {
        let url = format!("{}/suites/{}/queries/{}", self.base_url, suite, dir);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(Error::HttpClient(format!(
                "Registry returned status {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let queries_response: QueriesResponse = response.json().await?;
        Ok(Some(queries_response.queries))
    }

    /// Engines the suite has schema bundles for
    pub async fn list_schema_engines(&self, suite: &str) -> Result<Option<Vec<String>>> {
        let url = format!("{}/suites/{}/schemas", self.base_url, suite);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(Error::HttpClient(format!(
                "Registry returned status {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let schemas_response: SchemasResponse = response.json().await?;
        Ok(Some(schemas_response.engines))
    }

    /// Fetch one SQL file as raw text, `None` on 404
    pub async fn fetch_query(&self, suite: &str, dir: &str, stem: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/suites/{}/queries/{}/{}.sql",
            self.base_url, suite, dir, stem
        );
        self.fetch_text(&url).await
    }

    /// Fetch a schema bundle as raw text, `None` on 404
    pub async fn fetch_schema(&self, suite: &str, engine: Engine) -> Result<Option<String>> {
        let url = format!(
            "{}/suites/{}/schemas/{}.sql",
            self.base_url,
            suite,
            engine.dir_name()
        );
        self.fetch_text(&url).await
    }

    /// Fetch `suite.properties`, `None` when the suite has no manifest
    pub async fn fetch_manifest(&self, suite: &str) -> Result<Option<String>> {
        let url = format!("{}/suites/{}/suite.properties", self.base_url, suite);
        self.fetch_text(&url).await
    }

    async fn fetch_text(&self, url: &str) -> Result<Option<String>> {
        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(Error::HttpClient(format!(
                "Registry returned status {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        Ok(Some(response.text().await?))
    }
}

fn dir_segment(engine: Option<Engine>) -> &'static str {
    match engine {
        Some(engine) => engine.dir_name(),
        None => COMMON_DIR,
    }
}

/// `CorpusProvider` over a corpus registry, making `BenchCatalog` work
/// against remote corpora unchanged
#[derive(Debug, Clone)]
pub struct RemoteCorpusProvider {
    client: CorpusRegistryClient,
}

impl RemoteCorpusProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: CorpusRegistryClient::new(base_url),
        }
    }
}

#[async_trait]
impl CorpusProvider for RemoteCorpusProvider {
    async fn list_suites(&self) -> Result<Vec<String>> {
        self.client.list_suites().await
    }

    async fn list_queries(&self, suite: &str, engine: Option<Engine>) -> Result<Vec<QueryId>> {
        let stems = self
            .client
            .list_queries(suite, dir_segment(engine))
            .await?
            .unwrap_or_default();

        Ok(stems.iter().map(|stem| QueryId::parse(stem)).collect())
    }

    async fn read_query(&self, suite: &str, engine: Option<Engine>, stem: &str) -> Result<String> {
        self.client
            .fetch_query(suite, dir_segment(engine), stem)
            .await?
            .ok_or_else(|| {
                Error::Internal(format!(
                    "No query file {} in {}/{}",
                    stem,
                    suite,
                    dir_segment(engine)
                ))
            })
    }

    async fn schema_engines(&self, suite: &str) -> Result<Vec<Engine>> {
        let names = self
            .client
            .list_schema_engines(suite)
            .await?
            .unwrap_or_default();

        Ok(names
            .iter()
            .filter_map(|name| Engine::from_string(name).ok())
            .collect())
    }

    async fn read_schema(&self, suite: &str, engine: Engine) -> Result<String> {
        self.client
            .fetch_schema(suite, engine)
            .await?
            .ok_or_else(|| Error::SchemaNotFound {
                suite: suite.to_string(),
                engine,
            })
    }

    async fn read_manifest(&self, suite: &str) -> Result<Option<SuiteManifest>> {
        match self.client.fetch_manifest(suite).await? {
            Some(text) => Ok(Some(SuiteManifest::parse(&text)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CorpusRegistryClient::new("http://localhost:9000");
        assert_eq!(client.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_deserialize_suites_response() {
        let json = r#"{"suites": ["rtabench", "time_series"]}"#;
        let response: SuitesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.suites, vec!["rtabench", "time_series"]);
    }

    #[test]
    fn test_deserialize_queries_response() {
        let json = r#"{"queries": ["0001_count_orders_from_terminal"]}"#;
        let response: QueriesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.queries.len(), 1);
    }

    #[test]
    fn test_dir_segment() {
        assert_eq!(dir_segment(Some(Engine::ClickHouse)), "clickhouse");
        assert_eq!(dir_segment(None), "common");
    }
}
