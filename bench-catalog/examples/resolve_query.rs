use bench_catalog::BenchCatalog;
use sql_corpus::Engine;

/// Example: resolve one benchmark query for a target engine
///
/// Prints the SQL text a harness would execute and the schema DDL it
/// must provision first. The query id may be a full stem or a bare
/// ordinal (`0001`).
///
/// Usage:
///   CORPUS_DIR=./corpus SUITE=rtabench QUERY=0001 ENGINE=clickhouse \
///     cargo run --example resolve_query
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let corpus_dir = std::env::var("CORPUS_DIR").unwrap_or_else(|_| "./corpus".to_string());
    let suite = std::env::var("SUITE").unwrap_or_else(|_| "rtabench".to_string());
    let query = std::env::var("QUERY").unwrap_or_else(|_| "0001".to_string());
    let engine = Engine::from_string(
        &std::env::var("ENGINE").unwrap_or_else(|_| "clickhouse".to_string()),
    )?;

    let catalog = BenchCatalog::open(&corpus_dir)?;

    let resolved = catalog.resolve(&suite, &query, engine).await?;

    println!(
        "Resolved {}/{} for {} ({})",
        resolved.suite,
        resolved.stem,
        resolved.engine,
        if resolved.engine_specific {
            "engine-specific variant"
        } else {
            "common variant"
        }
    );
    println!("\n{}", resolved.sql);

    let schema = catalog.schema_for(&suite, engine).await?;
    println!("Schema to provision first:\n\n{}", schema);

    Ok(())
}
