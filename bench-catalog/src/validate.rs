//! Static corpus validation
//!
//! Checks what can be checked without a live engine: every variant must
//! parse under its engine's SQL dialect, reference only tables its schema
//! bundle creates, and every schema bundle must be re-applicable. Actual
//! execution errors (type mismatches, engine-specific function behavior)
//! only surface against the real engine and are out of reach here.

use crate::catalog::BenchCatalog;
use crate::error::{Error, Result};
use sql_corpus::{Engine, SchemaDdl};
use sqlparser::ast::{Expr, Query, Select, SetExpr, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::{
    ClickHouseDialect, Dialect, DuckDbDialect, GenericDialect, PostgreSqlDialect,
};
use sqlparser::parser::Parser;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// The `sqlparser` dialect that best matches an engine's SQL surface
///
/// MonetDB and QuestDB have no dedicated dialect; the generic one accepts
/// their variants as written in this corpus.
pub fn sqlparser_dialect(engine: Engine) -> Box<dyn Dialect> {
    match engine {
        Engine::Postgres | Engine::TimescaleDb => Box::new(PostgreSqlDialect {}),
        Engine::ClickHouse => Box::new(ClickHouseDialect {}),
        Engine::DuckDb => Box::new(DuckDbDialect {}),
        Engine::MonetDb | Engine::QuestDb => Box::new(GenericDialect {}),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    Syntax,
    UnknownTable,
    NonIdempotentSchema,
}

#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub suite: String,
    pub engine: Engine,
    /// `None` for schema-level issues
    pub query: Option<String>,
    pub kind: IssueKind,
    pub detail: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    pub checked_variants: usize,
    pub checked_schemas: usize,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn merge(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
        self.checked_variants += other.checked_variants;
        self.checked_schemas += other.checked_schemas;
    }
}

/// Validate every suite in the catalog, fanning out per suite
pub async fn validate_corpus(catalog: &BenchCatalog) -> Result<ValidationReport> {
    let suites = catalog.suites().await?;

    let results = futures::future::join_all(
        suites.iter().map(|suite| validate_suite(catalog, suite)),
    )
    .await;

    let mut report = ValidationReport::default();
    for result in results {
        report.merge(result?);
    }

    Ok(report)
}

/// Validate one suite across every engine it has a schema for
pub async fn validate_suite(catalog: &BenchCatalog, suite: &str) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();
    let query_ids = catalog.query_ids(suite).await?;

    for engine in Engine::ALL {
        let ddl_text = match catalog.schema_for(suite, engine).await {
            Ok(text) => text,
            Err(Error::SchemaNotFound { .. }) => continue,
            Err(e) => return Err(e),
        };

        let ddl = SchemaDdl::parse(&ddl_text);
        report.checked_schemas += 1;

        if !ddl.is_idempotent() {
            warn!("{} schema for {} is not re-applicable", engine, suite);
            report.issues.push(ValidationIssue {
                suite: suite.to_string(),
                engine,
                query: None,
                kind: IssueKind::NonIdempotentSchema,
                detail: "schema bundle cannot be applied twice".to_string(),
            });
        }

        let tables = ddl.created_tables();
        let dialect = sqlparser_dialect(engine);

        for stem in &query_ids {
            let resolved = match catalog.resolve(suite, stem, engine).await {
                Ok(resolved) => resolved,
                Err(Error::QueryNotFound { .. }) => continue,
                Err(e) => return Err(e),
            };

            debug!("Validating {}/{} against {}", suite, stem, engine);
            report.checked_variants += 1;

            let statements = match Parser::parse_sql(&*dialect, &resolved.sql) {
                Ok(statements) => statements,
                Err(e) => {
                    report.issues.push(ValidationIssue {
                        suite: suite.to_string(),
                        engine,
                        query: Some(stem.clone()),
                        kind: IssueKind::Syntax,
                        detail: e.to_string(),
                    });
                    continue;
                }
            };

            for table in referenced_tables(&statements) {
                if !tables.contains(&table) {
                    report.issues.push(ValidationIssue {
                        suite: suite.to_string(),
                        engine,
                        query: Some(stem.clone()),
                        kind: IssueKind::UnknownTable,
                        detail: format!("references table {} not in the {} schema", table, engine),
                    });
                }
            }
        }
    }

    Ok(report)
}

/// Base table names a query reads, lowercased, CTE names excluded
pub fn referenced_tables(statements: &[Statement]) -> BTreeSet<String> {
    let mut tables = BTreeSet::new();
    let mut ctes = BTreeSet::new();

    for stmt in statements {
        if let Statement::Query(query) = stmt {
            collect_query(query, &mut tables, &mut ctes);
        }
    }

    tables.retain(|table| !ctes.contains(table));
    tables
}

fn collect_query(query: &Query, tables: &mut BTreeSet<String>, ctes: &mut BTreeSet<String>) {
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            ctes.insert(cte.alias.name.value.to_lowercase());
            collect_query(&cte.query, tables, ctes);
        }
    }

    collect_set_expr(&query.body, tables, ctes);
}

fn collect_set_expr(body: &SetExpr, tables: &mut BTreeSet<String>, ctes: &mut BTreeSet<String>) {
    match body {
        SetExpr::Select(select) => collect_select(select, tables, ctes),
        SetExpr::Query(query) => collect_query(query, tables, ctes),
        SetExpr::SetOperation { left, right, .. } => {
            collect_set_expr(left, tables, ctes);
            collect_set_expr(right, tables, ctes);
        }
        _ => {}
    }
}

fn collect_select(select: &Select, tables: &mut BTreeSet<String>, ctes: &mut BTreeSet<String>) {
    for table_with_joins in &select.from {
        collect_table_with_joins(table_with_joins, tables, ctes);
    }

    if let Some(selection) = &select.selection {
        collect_expr(selection, tables, ctes);
    }
}

fn collect_table_with_joins(
    table_with_joins: &TableWithJoins,
    tables: &mut BTreeSet<String>,
    ctes: &mut BTreeSet<String>,
) {
    collect_factor(&table_with_joins.relation, tables, ctes);

    for join in &table_with_joins.joins {
        collect_factor(&join.relation, tables, ctes);
    }
}

fn collect_factor(factor: &TableFactor, tables: &mut BTreeSet<String>, ctes: &mut BTreeSet<String>) {
    match factor {
        TableFactor::Table { name, .. } => {
            tables.insert(base_table_name(&name.to_string()));
        }
        TableFactor::Derived { subquery, .. } => collect_query(subquery, tables, ctes),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => collect_table_with_joins(table_with_joins, tables, ctes),
        _ => {}
    }
}

fn collect_expr(expr: &Expr, tables: &mut BTreeSet<String>, ctes: &mut BTreeSet<String>) {
    match expr {
        Expr::BinaryOp { left, right, .. } => {
            collect_expr(left, tables, ctes);
            collect_expr(right, tables, ctes);
        }
        Expr::UnaryOp { expr, .. } | Expr::Nested(expr) => collect_expr(expr, tables, ctes),
        Expr::Exists { subquery, .. } | Expr::Subquery(subquery) => {
            collect_query(subquery, tables, ctes)
        }
        Expr::InSubquery { expr, subquery, .. } => {
            collect_expr(expr, tables, ctes);
            collect_query(subquery, tables, ctes);
        }
        _ => {}
    }
}

/// `db.schema.orders` -> `orders`, quotes stripped
fn base_table_name(full: &str) -> String {
    let last = full.rsplit('.').next().unwrap_or(full);
    last.trim_matches(|c| c == '"' || c == '`').to_lowercase()
}
