use sql_corpus::Engine;
use std::fmt;

#[derive(Debug)]
pub enum Error {
    Corpus(sql_corpus::Error),
    SuiteNotFound(String),
    QueryNotFound {
        suite: String,
        query: String,
        engine: Engine,
    },
    AmbiguousQuery {
        suite: String,
        query: String,
        engine: Engine,
        candidates: Vec<String>,
    },
    SchemaNotFound {
        suite: String,
        engine: Engine,
    },
    #[cfg(feature = "remote")]
    HttpClient(String),
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Corpus(e) => write!(f, "Corpus error: {}", e),
            Error::SuiteNotFound(suite) => write!(f, "Suite not found: {}", suite),
            Error::QueryNotFound {
                suite,
                query,
                engine,
            } => write!(f, "No {} variant of {}/{}", engine, suite, query),
            Error::AmbiguousQuery {
                suite,
                query,
                engine,
                candidates,
            } => write!(
                f,
                "Ambiguous query id {} in {} ({}): candidates {}",
                query,
                suite,
                engine,
                candidates.join(", ")
            ),
            Error::SchemaNotFound { suite, engine } => {
                write!(f, "No {} schema for suite {}", engine, suite)
            }
            #[cfg(feature = "remote")]
            Error::HttpClient(msg) => write!(f, "HTTP client error: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<sql_corpus::Error> for Error {
    fn from(err: sql_corpus::Error) -> Self {
        Error::Corpus(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Corpus(sql_corpus::Error::Io(err))
    }
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::HttpClient(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
