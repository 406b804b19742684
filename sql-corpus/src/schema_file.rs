use crate::error::Result;
use crate::query_file::read_sql_file;
use std::collections::BTreeSet;
use std::path::Path;

/// One engine's DDL bundle for a suite
///
/// Statements are split the way a harness splits them before execution:
/// on `;`, dropping chunks that are empty or comment-only.
#[derive(Debug, Clone)]
pub struct SchemaDdl {
    raw: String,
    statements: Vec<String>,
}

impl SchemaDdl {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = read_sql_file(path)?;
        Ok(Self::parse(&raw))
    }

    pub fn parse(content: &str) -> Self {
        let statements = content
            .split(';')
            .map(str::trim)
            .filter(|stmt| {
                !stmt.is_empty()
                    && !stmt.lines().all(|line| {
                        let line = line.trim();
                        line.is_empty() || line.starts_with("--")
                    })
            })
            .map(|stmt| stmt.to_string())
            .collect();

        SchemaDdl {
            raw: content.to_string(),
            statements,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Table names created by this bundle, lowercased, quotes stripped
    pub fn created_tables(&self) -> BTreeSet<String> {
        self.statements
            .iter()
            .filter_map(|stmt| created_table(&tokenize(stmt)).map(|(name, _)| name))
            .collect()
    }

    /// A bundle is idempotent when applying it twice cannot error:
    /// every `CREATE TABLE` carries `IF NOT EXISTS` or is covered by a
    /// guarded `DROP TABLE IF EXISTS`, and no drop is unguarded (an
    /// unguarded drop fails the *first* apply on an empty database).
    pub fn is_idempotent(&self) -> bool {
        let mut guarded_drops = BTreeSet::new();

        for stmt in &self.statements {
            let tokens = tokenize(stmt);

            if let Some((name, guarded)) = dropped_table(&tokens) {
                if !guarded {
                    return false;
                }
                guarded_drops.insert(name);
            }
        }

        for stmt in &self.statements {
            let tokens = tokenize(stmt);

            if let Some((name, if_not_exists)) = created_table(&tokens) {
                if !if_not_exists && !guarded_drops.contains(&name) {
                    return false;
                }
            }
        }

        true
    }
}

fn tokenize(stmt: &str) -> Vec<String> {
    stmt.lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .map(|token| token.to_lowercase())
        .collect()
}

/// `create table [if not exists] <name>` -> (name, had_if_not_exists)
fn created_table(tokens: &[String]) -> Option<(String, bool)> {
    if tokens.len() < 3 || tokens[0] != "create" || tokens[1] != "table" {
        return None;
    }

    if tokens.len() >= 6 && tokens[2] == "if" && tokens[3] == "not" && tokens[4] == "exists" {
        return Some((clean_identifier(&tokens[5]), true));
    }

    Some((clean_identifier(&tokens[2]), false))
}

/// `drop table [if exists] <name>` -> (name, had_if_exists)
fn dropped_table(tokens: &[String]) -> Option<(String, bool)> {
    if tokens.len() < 3 || tokens[0] != "drop" || tokens[1] != "table" {
        return None;
    }

    if tokens.len() >= 5 && tokens[2] == "if" && tokens[3] == "exists" {
        return Some((clean_identifier(&tokens[4]), true));
    }

    Some((clean_identifier(&tokens[2]), false))
}

/// The `customers(` in `CREATE TABLE customers(...)` needs the paren cut
fn clean_identifier(token: &str) -> String {
    let token = token.split('(').next().unwrap_or(token);
    token.trim_matches(|c| c == '"' || c == '`').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_drops_comment_only_chunks() {
        let ddl = SchemaDdl::parse(
            "-- rtabench schema\n\nCREATE TABLE IF NOT EXISTS customers (customer_id integer);\n\n-- trailing comment\n",
        );

        assert_eq!(ddl.statements().len(), 1);
    }

    #[test]
    fn test_created_tables() {
        let ddl = SchemaDdl::parse(
            r#"
CREATE TABLE IF NOT EXISTS customers (customer_id integer);
CREATE TABLE IF NOT EXISTS "orders" (order_id integer);
CREATE INDEX IF NOT EXISTS orders_idx ON orders (order_id);
"#,
        );

        let tables = ddl.created_tables();
        assert!(tables.contains("customers"));
        assert!(tables.contains("orders"));
        assert_eq!(tables.len(), 2);
    }

    #[test]
    fn test_create_without_space_before_paren() {
        let ddl = SchemaDdl::parse("CREATE TABLE customers(customer_id integer);");
        assert!(ddl.created_tables().contains("customers"));
    }

    #[test]
    fn test_if_not_exists_is_idempotent() {
        let ddl = SchemaDdl::parse("CREATE TABLE IF NOT EXISTS t (x integer);");
        assert!(ddl.is_idempotent());
    }

    #[test]
    fn test_guarded_drop_is_idempotent() {
        let ddl = SchemaDdl::parse(
            "DROP TABLE IF EXISTS customers;\nCREATE TABLE customers (customer_id integer);",
        );
        assert!(ddl.is_idempotent());
    }

    #[test]
    fn test_bare_create_is_not_idempotent() {
        let ddl = SchemaDdl::parse("CREATE TABLE t (x integer);");
        assert!(!ddl.is_idempotent());
    }

    #[test]
    fn test_unguarded_drop_is_not_idempotent() {
        let ddl =
            SchemaDdl::parse("DROP TABLE customers;\nCREATE TABLE customers (customer_id integer);");
        assert!(!ddl.is_idempotent());
    }

    #[test]
    fn test_storage_directives_are_kept_as_statements() {
        let ddl = SchemaDdl::parse(
            r#"
CREATE TABLE IF NOT EXISTS order_events (order_id integer, event_created timestamp);
SELECT create_hypertable('order_events', 'event_created', if_not_exists => TRUE);
ALTER TABLE order_events SET (timescaledb.compress);
"#,
        );

        assert_eq!(ddl.statements().len(), 3);
        assert_eq!(ddl.created_tables().len(), 1);
        assert!(ddl.is_idempotent());
    }
}
