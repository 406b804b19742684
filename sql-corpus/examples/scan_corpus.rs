use sql_corpus::CorpusTree;

/// Example: scan a corpus directory and print what it contains
///
/// Usage:
///   CORPUS_DIR=./corpus cargo run --example scan_corpus
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let corpus_dir = std::env::var("CORPUS_DIR").unwrap_or_else(|_| "./corpus".to_string());

    let corpus = CorpusTree::scan(&corpus_dir)?;

    println!("Corpus: {}", corpus.root.display());

    for (name, suite) in &corpus.suites {
        println!("\nSuite: {}", name);
        println!("  {} common queries", suite.common_queries.len());

        for (engine, files) in &suite.engine_queries {
            println!("  {} {} queries", files.len(), engine);
        }

        println!(
            "  Schemas: {}",
            suite
                .schemas
                .keys()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        for stem in suite.query_ids() {
            println!("    - {}", stem);
        }
    }

    Ok(())
}
