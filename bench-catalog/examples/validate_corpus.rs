use bench_catalog::validate::validate_corpus;
use bench_catalog::BenchCatalog;

/// Example: statically validate a corpus
///
/// Checks that every variant parses under its engine's SQL dialect and
/// references only tables its schema bundle creates, and that every
/// schema bundle is re-applicable. Exits non-zero when issues are found
/// so this can gate a corpus change in CI.
///
/// Usage:
///   CORPUS_DIR=./corpus cargo run --example validate_corpus
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bench_catalog=info".into()),
        )
        .init();

    let corpus_dir = std::env::var("CORPUS_DIR").unwrap_or_else(|_| "./corpus".to_string());

    let catalog = BenchCatalog::open(&corpus_dir)?;
    let report = validate_corpus(&catalog).await?;

    println!(
        "Checked {} variants and {} schemas in {}",
        report.checked_variants, report.checked_schemas, corpus_dir
    );

    if report.is_clean() {
        println!("No issues found");
        return Ok(());
    }

    println!("{} issues:", report.issues.len());
    for issue in &report.issues {
        match &issue.query {
            Some(query) => println!(
                "  {}/{} [{}] {:?}: {}",
                issue.suite, query, issue.engine, issue.kind, issue.detail
            ),
            None => println!(
                "  {} [{}] {:?}: {}",
                issue.suite, issue.engine, issue.kind, issue.detail
            ),
        }
    }

    std::process::exit(1);
}
