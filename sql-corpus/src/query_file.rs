use crate::engine::Engine;
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Parsed query-file stem, e.g. `0001_count_orders_from_terminal`
///
/// The ordinal is the leading run of ASCII digits when it is followed by
/// `_` (or makes up the whole stem). Stems without one are legal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryId {
    pub ordinal: Option<u32>,
    pub stem: String,
}

impl QueryId {
    pub fn parse(stem: &str) -> Self {
        let digits = stem.chars().take_while(|c| c.is_ascii_digit()).count();

        let ordinal = if digits > 0 && (digits == stem.len() || stem.as_bytes()[digits] == b'_') {
            stem[..digits].parse::<u32>().ok()
        } else {
            None
        };

        QueryId {
            ordinal,
            stem: stem.to_string(),
        }
    }

    /// A request matches on the exact stem, or on a bare ordinal
    /// (`"0001"` matches `0001_count_orders_from_terminal`). Ordinals
    /// compare numerically, so `"01"` and `"0001"` are the same request.
    pub fn matches(&self, requested: &str) -> bool {
        if self.stem == requested {
            return true;
        }

        match (self.ordinal, QueryId::parse(requested).ordinal) {
            (Some(ours), Some(theirs)) if requested.chars().all(|c| c.is_ascii_digit()) => {
                ours == theirs
            }
            _ => false,
        }
    }
}

/// One SQL file in a suite: common (`engine == None`) or engine-specific
#[derive(Debug, Clone)]
pub struct QueryFile {
    pub id: QueryId,
    pub engine: Option<Engine>,
    pub path: PathBuf,
}

impl QueryFile {
    /// Accepts `<stem>.sql` paths (and `<stem>.sql.gz` with the flate2
    /// feature); anything else is not a query file.
    pub fn from_path(path: &Path, engine: Option<Engine>) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let stem = sql_stem(name)?;

        Some(QueryFile {
            id: QueryId::parse(stem),
            engine,
            path: path.to_path_buf(),
        })
    }

    pub fn read(&self) -> Result<String> {
        read_sql_file(&self.path)
    }
}

/// Strip the `.sql` / `.sql.gz` suffix, or `None` for non-SQL names
pub fn sql_stem(file_name: &str) -> Option<&str> {
    #[cfg(feature = "flate2")]
    if let Some(stem) = file_name.strip_suffix(".sql.gz") {
        return Some(stem);
    }

    file_name.strip_suffix(".sql")
}

/// Read SQL text, transparently gunzipping `*.gz` files
pub fn read_sql_file(path: &Path) -> Result<String> {
    #[cfg(feature = "flate2")]
    if path.extension().is_some_and(|ext| ext == "gz") {
        use std::io::Read;

        let file = fs::File::open(path)?;
        let mut decoder = flate2::read::GzDecoder::new(file);
        let mut text = String::new();
        decoder.read_to_string(&mut text)?;
        return Ok(text);
    }

    Ok(fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ordinal_stem() {
        let id = QueryId::parse("0001_count_orders_from_terminal");
        assert_eq!(id.ordinal, Some(1));
        assert_eq!(id.stem, "0001_count_orders_from_terminal");
    }

    #[test]
    fn test_parse_short_ordinal() {
        let id = QueryId::parse("01_calendar_count");
        assert_eq!(id.ordinal, Some(1));
    }

    #[test]
    fn test_parse_ordinal_less_stem() {
        let id = QueryId::parse("global_agg");
        assert_eq!(id.ordinal, None);
    }

    #[test]
    fn test_digits_without_separator_are_not_an_ordinal() {
        let id = QueryId::parse("0001count");
        assert_eq!(id.ordinal, None);
    }

    #[test]
    fn test_matches_exact_stem() {
        let id = QueryId::parse("0001_count_orders_from_terminal");
        assert!(id.matches("0001_count_orders_from_terminal"));
        assert!(!id.matches("0001_count_orders"));
    }

    #[test]
    fn test_matches_bare_ordinal() {
        let id = QueryId::parse("0001_count_orders_from_terminal");
        assert!(id.matches("0001"));
        assert!(id.matches("1"));
        assert!(!id.matches("2"));
    }

    #[test]
    fn test_from_path() {
        let file = QueryFile::from_path(
            Path::new("/corpus/rtabench/queries/postgres/0001_count_orders_from_terminal.sql"),
            Some(Engine::Postgres),
        )
        .unwrap();

        assert_eq!(file.id.ordinal, Some(1));
        assert_eq!(file.engine, Some(Engine::Postgres));
    }

    #[test]
    fn test_from_path_rejects_non_sql() {
        assert!(QueryFile::from_path(Path::new("/corpus/suite.properties"), None).is_none());
        assert!(QueryFile::from_path(Path::new("/corpus/README.md"), None).is_none());
    }

    #[cfg(feature = "flate2")]
    #[test]
    fn test_gzip_stem() {
        assert_eq!(sql_stem("0001_x.sql.gz"), Some("0001_x"));
    }

    #[cfg(feature = "flate2")]
    #[test]
    fn test_read_gzipped_query() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0001_x.sql.gz");

        let file = fs::File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(b"SELECT 1;").unwrap();
        encoder.finish().unwrap();

        assert_eq!(read_sql_file(&path).unwrap(), "SELECT 1;");
    }
}
