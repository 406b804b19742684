// Cross-engine benchmark query catalog and dialect resolver

pub mod catalog;
pub mod error;
pub mod provider;
pub mod validate;

#[cfg(feature = "remote")]
pub mod fetch;
#[cfg(feature = "remote")]
pub mod remote;

pub use catalog::{BenchCatalog, ResolvedQuery};
pub use error::{Error, Result};
pub use provider::{CorpusProvider, FileSystemCorpusProvider};
pub use validate::{IssueKind, ValidationIssue, ValidationReport};
