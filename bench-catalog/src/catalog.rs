use crate::error::{Error, Result};
use crate::provider::{CorpusProvider, FileSystemCorpusProvider};
use sql_corpus::{Engine, QueryId};
use std::collections::BTreeSet;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Resolved SQL text for one (suite, query, engine) triple
#[derive(Debug, Clone)]
pub struct ResolvedQuery {
    pub suite: String,
    pub stem: String,
    pub engine: Engine,
    /// `false` when the suite-default (common) variant was used
    pub engine_specific: bool,
    pub sql: String,
}

/// Catalog over a benchmark SQL corpus
pub struct BenchCatalog {
    provider: Arc<dyn CorpusProvider>,
}

impl BenchCatalog {
    /// Create a catalog from a corpus directory
    /// (e.g., ./corpus with rtabench/, kaggle_airbnb/, time_series/)
    pub fn open<P: AsRef<Path>>(corpus_root: P) -> Result<Self> {
        let corpus_root = corpus_root.as_ref().to_path_buf();

        if !corpus_root.exists() {
            return Err(Error::Internal(format!(
                "Corpus root does not exist: {}",
                corpus_root.display()
            )));
        }

        Ok(Self::with_provider(Arc::new(FileSystemCorpusProvider::new(
            corpus_root,
        ))))
    }

    pub fn with_provider(provider: Arc<dyn CorpusProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn CorpusProvider> {
        &self.provider
    }

    pub async fn suites(&self) -> Result<Vec<String>> {
        self.provider.list_suites().await
    }

    /// Every query stem in the suite, across common and engine directories
    pub async fn query_ids(&self, suite: &str) -> Result<BTreeSet<String>> {
        let mut ids: BTreeSet<String> = self
            .provider
            .list_queries(suite, None)
            .await?
            .into_iter()
            .map(|id| id.stem)
            .collect();

        for engine in Engine::ALL {
            ids.extend(
                self.provider
                    .list_queries(suite, Some(engine))
                    .await?
                    .into_iter()
                    .map(|id| id.stem),
            );
        }

        Ok(ids)
    }

    /// Locate the SQL text to run for `(suite, query_id, engine)`
    ///
    /// The engine's own directory wins; the common directory is the
    /// fallback. A manifest `incompatible` entry suppresses the fallback
    /// (an explicit engine file is taken as proof of compatibility). More
    /// than one match — reachable through bare-ordinal lookup — is
    /// refused, never tie-broken.
    pub async fn resolve(
        &self,
        suite: &str,
        query_id: &str,
        engine: Engine,
    ) -> Result<ResolvedQuery> {
        let own = self.provider.list_queries(suite, Some(engine)).await?;
        let matches = matching(&own, query_id);

        match matches.len() {
            1 => {
                let stem = matches[0].stem.clone();
                let sql = self.provider.read_query(suite, Some(engine), &stem).await?;

                return Ok(ResolvedQuery {
                    suite: suite.to_string(),
                    stem,
                    engine,
                    engine_specific: true,
                    sql,
                });
            }
            0 => {}
            _ => {
                return Err(Error::AmbiguousQuery {
                    suite: suite.to_string(),
                    query: query_id.to_string(),
                    engine,
                    candidates: matches.iter().map(|id| id.stem.clone()).collect(),
                });
            }
        }

        let manifest = self.provider.read_manifest(suite).await?;
        let common = self.provider.list_queries(suite, None).await?;
        let mut matches = matching(&common, query_id);

        if let Some(manifest) = &manifest {
            matches.retain(|id| !manifest.is_incompatible(&id.stem, engine));
        }

        match matches.len() {
            1 => {
                let stem = matches[0].stem.clone();
                debug!("{}/{} falls back to the common variant for {}", suite, stem, engine);

                let sql = self.provider.read_query(suite, None, &stem).await?;

                Ok(ResolvedQuery {
                    suite: suite.to_string(),
                    stem,
                    engine,
                    engine_specific: false,
                    sql,
                })
            }
            0 => Err(Error::QueryNotFound {
                suite: suite.to_string(),
                query: query_id.to_string(),
                engine,
            }),
            _ => Err(Error::AmbiguousQuery {
                suite: suite.to_string(),
                query: query_id.to_string(),
                engine,
                candidates: matches.iter().map(|id| id.stem.clone()).collect(),
            }),
        }
    }

    /// DDL bundle to provision before running any query in the suite
    pub async fn schema_for(&self, suite: &str, engine: Engine) -> Result<String> {
        self.provider.read_schema(suite, engine).await
    }

    /// Engines with a runnable variant: a query file (own or common) plus
    /// a schema bundle, minus manifest-declared incompatibles
    pub async fn engines_for(&self, suite: &str, query_id: &str) -> Result<BTreeSet<Engine>> {
        let manifest = self.provider.read_manifest(suite).await?;
        let schema_engines: BTreeSet<Engine> = self
            .provider
            .schema_engines(suite)
            .await?
            .into_iter()
            .collect();

        let common = self.provider.list_queries(suite, None).await?;
        let common_matches = matching(&common, query_id);

        let mut engines = BTreeSet::new();

        for engine in Engine::ALL {
            if !schema_engines.contains(&engine) {
                continue;
            }

            let own = self.provider.list_queries(suite, Some(engine)).await?;
            if !matching(&own, query_id).is_empty() {
                engines.insert(engine);
                continue;
            }

            let fallback_allowed = common_matches.iter().any(|id| {
                manifest
                    .as_ref()
                    .map(|m| !m.is_incompatible(&id.stem, engine))
                    .unwrap_or(true)
            });

            if fallback_allowed {
                engines.insert(engine);
            }
        }

        Ok(engines)
    }

    /// Manifest iteration count for the query, 1 when unspecified
    pub async fn iterations(&self, suite: &str, query_id: &str) -> Result<u32> {
        let Some(manifest) = self.provider.read_manifest(suite).await? else {
            return Ok(1);
        };

        let ids = self.query_ids(suite).await?;
        let stem = ids
            .iter()
            .find(|stem| QueryId::parse(stem).matches(query_id));

        Ok(stem.map(|stem| manifest.iterations(stem)).unwrap_or(1))
    }

    // Sync facades for harnesses that are not async themselves. Must not
    // be called from inside an async context.

    pub fn resolve_blocking(
        &self,
        suite: &str,
        query_id: &str,
        engine: Engine,
    ) -> Result<ResolvedQuery> {
        block_on(self.resolve(suite, query_id, engine))
    }

    pub fn schema_for_blocking(&self, suite: &str, engine: Engine) -> Result<String> {
        block_on(self.schema_for(suite, engine))
    }

    pub fn engines_for_blocking(&self, suite: &str, query_id: &str) -> Result<BTreeSet<Engine>> {
        block_on(self.engines_for(suite, query_id))
    }

    pub fn suites_blocking(&self) -> Result<Vec<String>> {
        block_on(self.suites())
    }

    pub fn query_ids_blocking(&self, suite: &str) -> Result<BTreeSet<String>> {
        block_on(self.query_ids(suite))
    }

    pub fn iterations_blocking(&self, suite: &str, query_id: &str) -> Result<u32> {
        block_on(self.iterations(suite, query_id))
    }
}

/// Exact stems win outright; bare-ordinal lookup may match several
fn matching<'a>(ids: &'a [QueryId], requested: &str) -> Vec<&'a QueryId> {
    let exact: Vec<&QueryId> = ids.iter().filter(|id| id.stem == requested).collect();

    if !exact.is_empty() {
        return exact;
    }

    ids.iter().filter(|id| id.matches(requested)).collect()
}

// Convert async to sync - try to use existing runtime, or create one if needed
fn block_on<F: Future>(future: F) -> F::Output {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle.block_on(future),
        Err(_) => {
            // No runtime exists, create a temporary one
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(future)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sql_corpus::SuiteManifest;
    use std::collections::HashMap;

    #[derive(Default)]
    struct StaticProvider {
        queries: HashMap<(String, Option<Engine>, String), String>,
        schemas: HashMap<(String, Engine), String>,
        manifests: HashMap<String, SuiteManifest>,
    }

    impl StaticProvider {
        fn add_query(&mut self, suite: &str, engine: Option<Engine>, stem: &str, sql: &str) {
            self.queries
                .insert((suite.to_string(), engine, stem.to_string()), sql.to_string());
        }

        fn add_schema(&mut self, suite: &str, engine: Engine, ddl: &str) {
            self.schemas
                .insert((suite.to_string(), engine), ddl.to_string());
        }

        fn add_manifest(&mut self, suite: &str, properties: &str) {
            self.manifests
                .insert(suite.to_string(), SuiteManifest::parse(properties).unwrap());
        }
    }

    #[async_trait]
    impl CorpusProvider for StaticProvider {
        async fn list_suites(&self) -> Result<Vec<String>> {
            let mut suites: Vec<String> = self
                .queries
                .keys()
                .map(|(suite, _, _)| suite.clone())
                .collect();
            suites.sort();
            suites.dedup();
            Ok(suites)
        }

        async fn list_queries(&self, suite: &str, engine: Option<Engine>) -> Result<Vec<QueryId>> {
            Ok(self
                .queries
                .keys()
                .filter(|(s, e, _)| s == suite && *e == engine)
                .map(|(_, _, stem)| QueryId::parse(stem))
                .collect())
        }

        async fn read_query(
            &self,
            suite: &str,
            engine: Option<Engine>,
            stem: &str,
        ) -> Result<String> {
            self.queries
                .get(&(suite.to_string(), engine, stem.to_string()))
                .cloned()
                .ok_or_else(|| Error::Internal(format!("No query {}", stem)))
        }

        async fn schema_engines(&self, suite: &str) -> Result<Vec<Engine>> {
            Ok(self
                .schemas
                .keys()
                .filter(|(s, _)| s == suite)
                .map(|(_, engine)| *engine)
                .collect())
        }

        async fn read_schema(&self, suite: &str, engine: Engine) -> Result<String> {
            self.schemas
                .get(&(suite.to_string(), engine))
                .cloned()
                .ok_or_else(|| Error::SchemaNotFound {
                    suite: suite.to_string(),
                    engine,
                })
        }

        async fn read_manifest(&self, suite: &str) -> Result<Option<SuiteManifest>> {
            Ok(self.manifests.get(suite).cloned())
        }
    }

    fn fixture_catalog() -> BenchCatalog {
        let mut provider = StaticProvider::default();

        provider.add_query(
            "rtabench",
            Some(Engine::ClickHouse),
            "0001_count_orders_from_terminal",
            "SELECT count() FROM order_events",
        );
        provider.add_query(
            "rtabench",
            None,
            "0016_customers_with_most_orders",
            "SELECT count(*) FROM orders",
        );
        provider.add_query(
            "rtabench",
            None,
            "0005_search_events_for_processor",
            "SELECT order_id FROM order_events",
        );

        for engine in [Engine::ClickHouse, Engine::Postgres, Engine::MonetDb] {
            provider.add_schema("rtabench", engine, "CREATE TABLE IF NOT EXISTS order_events (order_id integer)");
        }

        provider.add_manifest(
            "rtabench",
            "suite.name=rtabench\n\
             query.0001_count_orders_from_terminal.iterations=5\n\
             query.0005_search_events_for_processor.incompatible=monetdb\n",
        );

        BenchCatalog::with_provider(Arc::new(provider))
    }

    #[tokio::test]
    async fn test_resolve_engine_specific() {
        let catalog = fixture_catalog();

        let resolved = catalog
            .resolve("rtabench", "0001_count_orders_from_terminal", Engine::ClickHouse)
            .await
            .unwrap();

        assert!(resolved.engine_specific);
        assert_eq!(resolved.sql, "SELECT count() FROM order_events");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_common() {
        let catalog = fixture_catalog();

        let resolved = catalog
            .resolve("rtabench", "0016_customers_with_most_orders", Engine::Postgres)
            .await
            .unwrap();

        assert!(!resolved.engine_specific);
        assert_eq!(resolved.sql, "SELECT count(*) FROM orders");
    }

    #[tokio::test]
    async fn test_resolve_by_bare_ordinal() {
        let catalog = fixture_catalog();

        let resolved = catalog
            .resolve("rtabench", "0001", Engine::ClickHouse)
            .await
            .unwrap();

        assert_eq!(resolved.stem, "0001_count_orders_from_terminal");
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let catalog = fixture_catalog();

        let err = catalog
            .resolve("rtabench", "0099_missing", Engine::Postgres)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::QueryNotFound { .. }));
    }

    #[tokio::test]
    async fn test_incompatible_engine_gets_no_fallback() {
        let catalog = fixture_catalog();

        let err = catalog
            .resolve("rtabench", "0005_search_events_for_processor", Engine::MonetDb)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::QueryNotFound { .. }));

        // Other engines still fall back to the common variant
        let resolved = catalog
            .resolve("rtabench", "0005_search_events_for_processor", Engine::Postgres)
            .await
            .unwrap();
        assert!(!resolved.engine_specific);
    }

    #[tokio::test]
    async fn test_ambiguous_ordinal_is_refused() {
        let mut provider = StaticProvider::default();
        provider.add_query("rtabench", Some(Engine::Postgres), "0001_v1", "SELECT 1");
        provider.add_query("rtabench", Some(Engine::Postgres), "0001_v2", "SELECT 2");

        let catalog = BenchCatalog::with_provider(Arc::new(provider));

        let err = catalog
            .resolve("rtabench", "0001", Engine::Postgres)
            .await
            .unwrap_err();

        match err {
            Error::AmbiguousQuery { candidates, .. } => {
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("Expected AmbiguousQuery, got {}", other),
        }

        // An exact stem is never ambiguous
        let resolved = catalog
            .resolve("rtabench", "0001_v1", Engine::Postgres)
            .await
            .unwrap();
        assert_eq!(resolved.sql, "SELECT 1");
    }

    #[tokio::test]
    async fn test_engines_for() {
        let catalog = fixture_catalog();

        // Engine-specific variant only where the file exists; common
        // variant everywhere a schema exists, minus incompatibles
        let engines = catalog
            .engines_for("rtabench", "0001_count_orders_from_terminal")
            .await
            .unwrap();
        assert_eq!(
            engines.into_iter().collect::<Vec<_>>(),
            vec![Engine::ClickHouse]
        );

        let engines = catalog
            .engines_for("rtabench", "0016_customers_with_most_orders")
            .await
            .unwrap();
        assert!(engines.contains(&Engine::ClickHouse));
        assert!(engines.contains(&Engine::Postgres));
        assert!(engines.contains(&Engine::MonetDb));
        // No duckdb schema in the fixture
        assert!(!engines.contains(&Engine::DuckDb));

        let engines = catalog
            .engines_for("rtabench", "0005_search_events_for_processor")
            .await
            .unwrap();
        assert!(!engines.contains(&Engine::MonetDb));
        assert!(engines.contains(&Engine::Postgres));
    }

    #[tokio::test]
    async fn test_iterations() {
        let catalog = fixture_catalog();

        assert_eq!(
            catalog
                .iterations("rtabench", "0001_count_orders_from_terminal")
                .await
                .unwrap(),
            5
        );
        // Bare-ordinal request finds the same manifest entry
        assert_eq!(catalog.iterations("rtabench", "0001").await.unwrap(), 5);
        assert_eq!(
            catalog
                .iterations("rtabench", "0016_customers_with_most_orders")
                .await
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_blocking_facade() {
        let catalog = fixture_catalog();

        let resolved = catalog
            .resolve_blocking("rtabench", "0001", Engine::ClickHouse)
            .unwrap();
        assert_eq!(resolved.stem, "0001_count_orders_from_terminal");

        let suites = catalog.suites_blocking().unwrap();
        assert_eq!(suites, vec!["rtabench"]);
    }
}
