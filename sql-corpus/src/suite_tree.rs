use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::manifest::SuiteManifest;
use crate::query_file::{sql_stem, QueryFile};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// One scanned suite directory
///
/// ```text
/// <suite>/
///   suite.properties          optional manifest
///   queries/<stem>.sql        common variants (any engine)
///   queries/<engine>/<stem>.sql
///   schemas/<engine>.sql
/// ```
///
/// Unknown engine directories under `queries/` and non-SQL files are
/// skipped.
#[derive(Debug)]
pub struct SuiteTree {
    pub name: String,
    pub root: PathBuf,
    pub common_queries: Vec<QueryFile>,
    pub engine_queries: BTreeMap<Engine, Vec<QueryFile>>,
    pub schemas: BTreeMap<Engine, PathBuf>,
    pub manifest: Option<SuiteManifest>,
}

impl SuiteTree {
    pub fn scan<P: AsRef<Path>>(suite_dir: P) -> Result<Self> {
        let root = suite_dir.as_ref().to_path_buf();

        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::InvalidLayout(format!("Not a suite directory: {}", root.display()))
            })?
            .to_string();

        let queries_dir = root.join("queries");
        if !queries_dir.is_dir() {
            return Err(Error::InvalidLayout(format!(
                "Suite {} has no queries directory",
                root.display()
            )));
        }

        let mut common_queries = Vec::new();
        let mut engine_queries = BTreeMap::new();

        for entry in fs::read_dir(&queries_dir)? {
            let path = entry?.path();

            if path.is_dir() {
                let Some(dir_name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let Ok(engine) = Engine::from_string(dir_name) else {
                    continue; // Not an engine directory
                };
                engine_queries.insert(engine, query_files_in(&path, Some(engine))?);
            } else if let Some(query) = QueryFile::from_path(&path, None) {
                common_queries.push(query);
            }
        }

        common_queries.sort_by(|a, b| a.id.stem.cmp(&b.id.stem));

        let mut schemas = BTreeMap::new();
        let schemas_dir = root.join("schemas");

        if schemas_dir.is_dir() {
            for entry in fs::read_dir(&schemas_dir)? {
                let path = entry?.path();
                let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let Some(stem) = sql_stem(file_name) else {
                    continue;
                };
                if let Ok(engine) = Engine::from_string(stem) {
                    schemas.insert(engine, path);
                }
            }
        }

        let manifest_path = root.join("suite.properties");
        let manifest = if manifest_path.is_file() {
            Some(SuiteManifest::from_file(&manifest_path)?)
        } else {
            None
        };

        Ok(SuiteTree {
            name,
            root,
            common_queries,
            engine_queries,
            schemas,
            manifest,
        })
    }

    /// Files in one directory: the engine's, or the common one for `None`
    pub fn queries_for(&self, engine: Option<Engine>) -> &[QueryFile] {
        match engine {
            None => &self.common_queries,
            Some(engine) => self
                .engine_queries
                .get(&engine)
                .map(|files| files.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Every stem in the suite, across common and engine directories
    pub fn query_ids(&self) -> BTreeSet<String> {
        let mut ids: BTreeSet<String> = self
            .common_queries
            .iter()
            .map(|q| q.id.stem.clone())
            .collect();

        for files in self.engine_queries.values() {
            ids.extend(files.iter().map(|q| q.id.stem.clone()));
        }

        ids
    }
}

fn query_files_in(dir: &Path, engine: Option<Engine>) -> Result<Vec<QueryFile>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            if let Some(query) = QueryFile::from_path(&path, engine) {
                files.push(query);
            }
        }
    }

    files.sort_by(|a, b| a.id.stem.cmp(&b.id.stem));
    Ok(files)
}

/// Scanned corpus root: every child directory with a `queries/` child is
/// a suite
#[derive(Debug)]
pub struct CorpusTree {
    pub root: PathBuf,
    pub suites: BTreeMap<String, SuiteTree>,
}

impl CorpusTree {
    pub fn scan<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.is_dir() {
            return Err(Error::InvalidLayout(format!(
                "Corpus root does not exist: {}",
                root.display()
            )));
        }

        let mut suites = BTreeMap::new();

        for entry in fs::read_dir(&root)? {
            let path = entry?.path();

            if path.is_dir() && path.join("queries").is_dir() {
                let suite = SuiteTree::scan(&path)?;
                suites.insert(suite.name.clone(), suite);
            }
        }

        Ok(CorpusTree { root, suites })
    }
}
