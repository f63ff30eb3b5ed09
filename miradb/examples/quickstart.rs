//! Quick start example for MiraDB.
//!
//! Builds an in-memory HNSW index over a handful of toy document
//! embeddings and runs a nearest-neighbour search.

use miradb::prelude::*;

fn main() -> Result<()> {
    println!("MiraDB Quick Start\n");

    // Small dimension for demonstration; real embeddings are 384-1536 dim.
    let index = HnswIndex::new(8, 16, HnswConfig::default());

    let documents = vec![
        (
            1u64,
            "Introduction to Rust programming",
            [0.9, 0.8, 0.1, 0.0, 0.1, 0.0, 0.2, 0.1],
        ),
        (
            2,
            "Advanced Rust patterns and idioms",
            [0.85, 0.9, 0.15, 0.05, 0.1, 0.0, 0.25, 0.15],
        ),
        (
            3,
            "Python for data science",
            [0.1, 0.2, 0.9, 0.85, 0.0, 0.1, 0.0, 0.2],
        ),
        (
            4,
            "Machine learning fundamentals",
            [0.2, 0.1, 0.7, 0.8, 0.6, 0.7, 0.1, 0.3],
        ),
        (
            5,
            "Systems programming with Rust",
            [0.8, 0.7, 0.2, 0.1, 0.15, 0.05, 0.3, 0.2],
        ),
    ];

    println!("Inserting {} documents...", documents.len());
    for (label, _, embedding) in &documents {
        index.insert(embedding.to_vec(), *label)?;
    }
    println!("Index contains {} vectors\n", index.len());

    // Search for documents similar to "Rust programming".
    let query = [0.88, 0.85, 0.12, 0.03, 0.12, 0.02, 0.22, 0.12];
    println!("Searching for documents similar to 'Rust programming'...\n");

    let results = index.search(&query, 3, None)?;

    println!("Top 3 Results:");
    println!("{:-<60}", "");
    for (rank, result) in results.iter().enumerate() {
        let title = documents
            .iter()
            .find(|(label, _, _)| *label == result.label)
            .map(|(_, title, _)| *title)
            .unwrap_or("Unknown");
        println!(
            "  {}. [ID: {}] {} (distance: {:.4})",
            rank + 1,
            result.label,
            title,
            result.distance.sqrt()
        );
    }
    println!("{:-<60}\n", "");

    println!("Done.");
    Ok(())
}
