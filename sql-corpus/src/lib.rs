// On-disk format of a cross-engine benchmark SQL corpus

pub mod engine;
pub mod error;
pub mod manifest;
pub mod query_file;
pub mod schema_file;
pub mod suite_tree;

pub use engine::{DialectTraits, Engine, TimeUnit};
pub use error::{Error, Result};
pub use manifest::SuiteManifest;
pub use query_file::{read_sql_file, QueryFile, QueryId};
pub use schema_file::SchemaDdl;
pub use suite_tree::{CorpusTree, SuiteTree};
