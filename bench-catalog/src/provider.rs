//! Corpus provider abstraction for suite and query discovery
//!
//! This module defines the `CorpusProvider` trait that abstracts the source
//! of corpus content (suite lists, query files, schema bundles) from the
//! catalog implementation.
//!
//! Two implementations are provided:
//! - `FileSystemCorpusProvider`: Reads a corpus directory tree on local disk
//! - `RemoteCorpusProvider`: Reads the same layout from a corpus registry
//!   over HTTP (requires the `remote` feature)

use crate::error::{Error, Result};
use async_trait::async_trait;
use sql_corpus::{read_sql_file, CorpusTree, Engine, QueryId, SuiteManifest, SuiteTree};
use std::path::PathBuf;
use tracing::debug;

/// Trait for discovering benchmark suites and reading their SQL
///
/// `engine = None` addresses a suite's *common* query directory — the
/// suite-default variants that apply to any engine without a specific
/// rewrite.
///
/// # Example
/// ```ignore
/// use bench_catalog::provider::CorpusProvider;
///
/// async fn dump_suites(provider: &dyn CorpusProvider) {
///     for suite in provider.list_suites().await.unwrap() {
///         println!("Suite: {}", suite);
///     }
/// }
/// ```
#[async_trait]
pub trait CorpusProvider: Send + Sync {
    /// List all suite names
    ///
    /// # Errors
    /// Returns error if the corpus source is unavailable or cannot be read
    async fn list_suites(&self) -> Result<Vec<String>>;

    /// Check if a suite exists
    async fn suite_exists(&self, name: &str) -> bool {
        self.list_suites()
            .await
            .map(|suites| suites.iter().any(|s| s == name))
            .unwrap_or(false)
    }

    /// Query ids present in one directory of a suite
    ///
    /// # Arguments
    /// * `suite` - Suite name
    /// * `engine` - The engine subdirectory, or `None` for the common
    ///   directory
    ///
    /// # Errors
    /// Returns `SuiteNotFound` if the suite does not exist. An engine
    /// without a subdirectory yields an empty list, not an error.
    async fn list_queries(&self, suite: &str, engine: Option<Engine>) -> Result<Vec<QueryId>>;

    /// Read the SQL text of one variant by exact stem
    ///
    /// # Errors
    /// Returns error if the suite or the file does not exist
    async fn read_query(&self, suite: &str, engine: Option<Engine>, stem: &str) -> Result<String>;

    /// Engines with a schema bundle in the suite
    async fn schema_engines(&self, suite: &str) -> Result<Vec<Engine>>;

    /// Read the schema DDL bundle for `(suite, engine)`
    ///
    /// # Errors
    /// Returns `SchemaNotFound` if the suite has no schema for the engine
    async fn read_schema(&self, suite: &str, engine: Engine) -> Result<String>;

    /// Suite manifest, `None` when the suite has no `suite.properties`
    async fn read_manifest(&self, suite: &str) -> Result<Option<SuiteManifest>>;
}

/// Discovers corpus content by scanning a local directory tree
///
/// Every call rescans the tree: the corpus is plain files and may be
/// edited between calls, so nothing is cached.
#[derive(Debug)]
pub struct FileSystemCorpusProvider {
    root: PathBuf,
}

impl FileSystemCorpusProvider {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn suite_tree(&self, suite: &str) -> Result<SuiteTree> {
        let dir = self.root.join(suite);

        if !dir.is_dir() {
            return Err(Error::SuiteNotFound(suite.to_string()));
        }

        Ok(SuiteTree::scan(dir)?)
    }
}

#[async_trait]
impl CorpusProvider for FileSystemCorpusProvider {
    async fn list_suites(&self) -> Result<Vec<String>> {
        debug!("Scanning corpus root {}", self.root.display());

        let corpus = CorpusTree::scan(&self.root)?;
        Ok(corpus.suites.into_keys().collect())
    }

    async fn list_queries(&self, suite: &str, engine: Option<Engine>) -> Result<Vec<QueryId>> {
        let tree = self.suite_tree(suite)?;

        Ok(tree
            .queries_for(engine)
            .iter()
            .map(|query| query.id.clone())
            .collect())
    }

    async fn read_query(&self, suite: &str, engine: Option<Engine>, stem: &str) -> Result<String> {
        let tree = self.suite_tree(suite)?;

        let file = tree
            .queries_for(engine)
            .iter()
            .find(|query| query.id.stem == stem)
            .ok_or_else(|| {
                Error::Internal(format!(
                    "No query file {} in {}/{}",
                    stem,
                    suite,
                    engine.map(|e| e.dir_name()).unwrap_or("common")
                ))
            })?;

        Ok(file.read()?)
    }

    async fn schema_engines(&self, suite: &str) -> Result<Vec<Engine>> {
        let tree = self.suite_tree(suite)?;
        Ok(tree.schemas.keys().copied().collect())
    }

    async fn read_schema(&self, suite: &str, engine: Engine) -> Result<String> {
        let tree = self.suite_tree(suite)?;

        let path = tree.schemas.get(&engine).ok_or_else(|| Error::SchemaNotFound {
            suite: suite.to_string(),
            engine,
        })?;

        Ok(read_sql_file(path)?)
    }

    async fn read_manifest(&self, suite: &str) -> Result<Option<SuiteManifest>> {
        let tree = self.suite_tree(suite)?;
        Ok(tree.manifest)
    }
}
