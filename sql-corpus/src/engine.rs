use crate::error::{Error, Result};
use std::fmt;

/// Target database engine, one per SQL dialect in the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Engine {
    ClickHouse,
    DuckDb,
    MonetDb,
    Postgres,
    QuestDb,
    TimescaleDb,
}

/// Truncation granularity for [`Engine::date_trunc_expr`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Hour,
    Day,
    Week,
    Month,
}

impl Engine {
    pub const ALL: [Engine; 6] = [
        Engine::ClickHouse,
        Engine::DuckDb,
        Engine::MonetDb,
        Engine::Postgres,
        Engine::QuestDb,
        Engine::TimescaleDb,
    ];

    pub fn from_string(s: &str) -> Result<Self> {
        match s {
            "clickhouse" => Ok(Engine::ClickHouse),
            "duckdb" => Ok(Engine::DuckDb),
            "monetdb" => Ok(Engine::MonetDb),
            "postgres" => Ok(Engine::Postgres),
            "questdb" => Ok(Engine::QuestDb),
            "timescaledb" => Ok(Engine::TimescaleDb),
            _ => Err(Error::UnknownEngine(s.to_string())),
        }
    }

    /// Directory name under `queries/` and file stem under `schemas/`
    pub fn dir_name(&self) -> &'static str {
        match self {
            Engine::ClickHouse => "clickhouse",
            Engine::DuckDb => "duckdb",
            Engine::MonetDb => "monetdb",
            Engine::Postgres => "postgres",
            Engine::QuestDb => "questdb",
            Engine::TimescaleDb => "timescaledb",
        }
    }

    pub fn traits(&self) -> DialectTraits {
        match self {
            Engine::ClickHouse => DialectTraits {
                supports_array_containment: true,
                // ClickHouse `String` columns have no true NULL; absent
                // values round-trip as ''
                empty_string_for_missing: true,
            },
            Engine::MonetDb => DialectTraits {
                supports_array_containment: false,
                empty_string_for_missing: false,
            },
            Engine::QuestDb => DialectTraits {
                supports_array_containment: false,
                empty_string_for_missing: false,
            },
            Engine::DuckDb | Engine::Postgres | Engine::TimescaleDb => DialectTraits {
                supports_array_containment: true,
                empty_string_for_missing: false,
            },
        }
    }

    /// Dialect spelling of "extract string value `key` from JSON column"
    pub fn json_extract_expr(&self, column: &str, key: &str) -> String {
        match self {
            Engine::Postgres | Engine::TimescaleDb => format!("{}->>'{}'", column, key),
            Engine::DuckDb => format!("json_extract_string({}, '$.{}')", column, key),
            Engine::ClickHouse => format!("JSONExtractString({}, '{}')", column, key),
            Engine::MonetDb => format!("json.filter({}, '$.{}')", column, key),
            Engine::QuestDb => format!("json_extract({}, '$.{}')", column, key),
        }
    }

    /// Dialect spelling of "truncate timestamp column to `unit`"
    pub fn date_trunc_expr(&self, unit: TimeUnit, column: &str) -> String {
        match self {
            Engine::ClickHouse => {
                let function = match unit {
                    TimeUnit::Hour => "toStartOfHour",
                    TimeUnit::Day => "toStartOfDay",
                    TimeUnit::Week => "toStartOfWeek",
                    TimeUnit::Month => "toStartOfMonth",
                };
                format!("{}({})", function, column)
            }
            Engine::QuestDb => {
                let unit = match unit {
                    TimeUnit::Hour => "h",
                    TimeUnit::Day => "d",
                    TimeUnit::Week => "w",
                    TimeUnit::Month => "M",
                };
                format!("timestamp_floor('{}', {})", unit, column)
            }
            Engine::DuckDb | Engine::MonetDb | Engine::Postgres | Engine::TimescaleDb => {
                let unit = match unit {
                    TimeUnit::Hour => "hour",
                    TimeUnit::Day => "day",
                    TimeUnit::Week => "week",
                    TimeUnit::Month => "month",
                };
                format!("date_trunc('{}', {})", unit, column)
            }
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Dialect capabilities a harness needs when deciding what to run where
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectTraits {
    /// Whether an array-containment predicate (`@>`, `list_has_all`,
    /// `hasAll`) is expressible at all
    pub supports_array_containment: bool,
    /// Whether absent string values surface as `''` instead of NULL
    pub empty_string_for_missing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string_roundtrip() {
        for engine in Engine::ALL {
            assert_eq!(Engine::from_string(engine.dir_name()).unwrap(), engine);
        }
    }

    #[test]
    fn test_unknown_engine() {
        let err = Engine::from_string("oracle").unwrap_err();
        assert!(err.to_string().contains("oracle"));
    }

    #[test]
    fn test_json_extract_spellings() {
        assert_eq!(
            Engine::Postgres.json_extract_expr("event_payload", "terminal"),
            "event_payload->>'terminal'"
        );
        assert_eq!(
            Engine::ClickHouse.json_extract_expr("event_payload", "terminal"),
            "JSONExtractString(event_payload, 'terminal')"
        );
        assert_eq!(
            Engine::MonetDb.json_extract_expr("event_payload", "terminal"),
            "json.filter(event_payload, '$.terminal')"
        );
    }

    #[test]
    fn test_date_trunc_spellings() {
        assert_eq!(
            Engine::Postgres.date_trunc_expr(TimeUnit::Day, "event_created"),
            "date_trunc('day', event_created)"
        );
        assert_eq!(
            Engine::ClickHouse.date_trunc_expr(TimeUnit::Month, "event_created"),
            "toStartOfMonth(event_created)"
        );
        assert_eq!(
            Engine::QuestDb.date_trunc_expr(TimeUnit::Day, "event_created"),
            "timestamp_floor('d', event_created)"
        );
    }

    #[test]
    fn test_clickhouse_has_no_true_null() {
        assert!(Engine::ClickHouse.traits().empty_string_for_missing);
        assert!(!Engine::Postgres.traits().empty_string_for_missing);
    }

    #[test]
    fn test_monetdb_lacks_array_containment() {
        assert!(!Engine::MonetDb.traits().supports_array_containment);
        assert!(Engine::DuckDb.traits().supports_array_containment);
    }
}
