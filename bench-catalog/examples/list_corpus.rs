use bench_catalog::BenchCatalog;

/// Example: walk a corpus and show what can run where
///
/// For every suite this lists the query ids and, per query, the engines
/// with a runnable variant (a query file plus a schema bundle, minus
/// manifest-declared incompatibles).
///
/// Usage:
///   CORPUS_DIR=./corpus cargo run --example list_corpus
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let corpus_dir = std::env::var("CORPUS_DIR").unwrap_or_else(|_| "./corpus".to_string());

    println!("Corpus: {}", corpus_dir);

    let catalog = BenchCatalog::open(&corpus_dir)?;

    for suite in catalog.suites().await? {
        println!("\nSuite: {}", suite);

        for stem in catalog.query_ids(&suite).await? {
            let engines = catalog.engines_for(&suite, &stem).await?;
            let iterations = catalog.iterations(&suite, &stem).await?;

            println!(
                "  {} ({} iterations): {}",
                stem,
                iterations,
                engines
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    Ok(())
}
