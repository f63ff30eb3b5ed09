//! Command-line interface for MiraDB.
//!
//! Thin wrapper over [`miradb::VectorStore`]: each invocation loads the
//! JSON document, performs one command, and saves when it mutated. The
//! HNSW index lives only in memory, so `search` rebuilds it from the
//! records on every run.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use miradb::{Error, VectorStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "miradb")]
#[command(about = "Embeddable vector database with HNSW search", long_about = None)]
struct Cli {
    /// Base path of the database; records live in `<path>.json`.
    db_path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize a new vector database
    Init {
        /// Dimensionality of all vectors in this database
        dimension: usize,
    },
    /// Add a vector; prints the assigned id
    Add {
        /// Comma-separated floats, e.g. '1.0,2.0,3.0'
        vector: String,
        /// Metadata as JSON, e.g. '{"key": "val"}'
        metadata: String,
    },
    /// Print a vector and its metadata by id
    Get { id: u64 },
    /// Replace a vector and its metadata (requires rebuild)
    Update {
        id: u64,
        /// Comma-separated floats
        vector: String,
        /// Metadata as JSON
        metadata: String,
    },
    /// Delete a vector (requires rebuild)
    Delete { id: u64 },
    /// Rebuild the HNSW index from the stored records
    Rebuild,
    /// Search for the k nearest neighbours
    Search {
        /// Number of neighbours to return
        k: usize,
        /// Comma-separated query vector
        vector: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // clap's usage errors normally exit 2; the contract here is 1 for any
    // failure, so parsing is routed through try_parse.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init { dimension } => {
            VectorStore::init(&cli.db_path, dimension)?;
            println!(
                "Database initialized at '{}' with dimension {}",
                cli.db_path.display(),
                dimension
            );
        }
        Command::Add { vector, metadata } => {
            let mut store = VectorStore::open(&cli.db_path)?;
            let vec = parse_vector(&vector, store.dim())?;
            let metadata = parse_metadata(&metadata)?;
            let id = store.add_vector(vec, metadata)?;
            store.save()?;
            println!("Vector added with ID: {id}. Run 'rebuild' to index.");
        }
        Command::Get { id } => {
            let store = VectorStore::open(&cli.db_path)?;
            let record = store.get(id).ok_or(Error::NotFound(id))?;
            println!("ID: {}", record.id);
            println!("Metadata: {}", serde_json::to_string_pretty(&record.metadata)?);
            let rendered: Vec<String> = record
                .vec
                .as_slice()
                .iter()
                .map(|x| x.to_string())
                .collect();
            println!("Vector: [{}]", rendered.join(", "));
        }
        Command::Update {
            id,
            vector,
            metadata,
        } => {
            let mut store = VectorStore::open(&cli.db_path)?;
            let vec = parse_vector(&vector, store.dim())?;
            let metadata = parse_metadata(&metadata)?;
            store.update_vector(id, vec, metadata)?;
            store.save()?;
            println!("Vector {id} updated. Run 'rebuild' to update index.");
        }
        Command::Delete { id } => {
            let mut store = VectorStore::open(&cli.db_path)?;
            store.delete_vector(id)?;
            store.save()?;
            println!("Vector {id} deleted. Run 'rebuild' to update index.");
        }
        Command::Rebuild => {
            let mut store = VectorStore::open(&cli.db_path)?;
            println!("Rebuilding index...");
            store.rebuild_index()?;
            println!("Index rebuild complete.");
            // The index is purely in-memory; nothing to save.
        }
        Command::Search { k, vector } => {
            let mut store = VectorStore::open(&cli.db_path)?;
            let query = parse_vector(&vector, store.dim())?;
            store.rebuild_index()?;
            let results = store.search(&query, k)?;

            println!("Search results (ID, Distance):");
            if results.is_empty() {
                println!("No results found.");
            }
            for (id, distance) in results {
                // The index returns squared L2; display the true distance.
                println!("- ID: {}, Dist: {}", id, distance.sqrt());
            }
        }
    }
    Ok(())
}

/// Parses a comma-separated vector string, enforcing the store dimension.
fn parse_vector(s: &str, expected_dim: usize) -> anyhow::Result<Vec<f32>> {
    let mut vec = Vec::new();
    for item in s.split(',') {
        let value: f32 = item
            .trim()
            .parse()
            .context("invalid vector format; must be comma-separated floats")?;
        vec.push(value);
    }
    if vec.len() != expected_dim {
        bail!(
            "vector dimension mismatch: expected {}, got {}",
            expected_dim,
            vec.len()
        );
    }
    Ok(vec)
}

/// Parses the metadata argument as an arbitrary JSON value.
fn parse_metadata(s: &str) -> anyhow::Result<serde_json::Value> {
    serde_json::from_str(s).context("invalid metadata; must be valid JSON")
}
