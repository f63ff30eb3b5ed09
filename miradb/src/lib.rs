//! # MiraDB
//!
//! **A small embeddable vector database with HNSW search, in pure Rust.**
//!
//! MiraDB provides in-process approximate nearest-neighbour search over
//! fixed-dimensional float vectors with attached opaque metadata:
//!
//! - **Semantic search** — Find similar documents, images, or audio
//! - **RAG applications** — Retrieval for LLM context
//! - **Recommendations** — Content-based filtering with embeddings
//!
//! ## Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | **HNSW Index** | Multi-layer proximity graph, O(log n) search |
//! | **Deterministic** | Seedable builds, id-ordered tie-breaking |
//! | **JSON Persistence** | Records in one human-readable document |
//! | **Concurrent Reads** | Searches run in parallel under a shared lock |
//!
//! ## Quick Start
//!
//! ### In-Memory Index
//!
//! ```rust
//! use miradb::prelude::*;
//!
//! // Create an index for 8-dimensional vectors
//! let index = HnswIndex::new(8, 1000, HnswConfig::default());
//!
//! // Insert vectors with caller-supplied labels
//! for i in 0..100u64 {
//!     let v: Vec<f32> = (0..8).map(|j| ((i * 8 + j) as f32).sin()).collect();
//!     index.insert(v, i).unwrap();
//! }
//!
//! // Search for the 10 nearest neighbours
//! let query: Vec<f32> = (0..8).map(|j| (j as f32).cos()).collect();
//! let results = index.search(&query, 10, None).unwrap();
//! assert_eq!(results.len(), 10);
//! ```
//!
//! ### Persistent Store
//!
//! ```no_run
//! use miradb::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     // Initialise a store; records land in `./my_vectors.json`
//!     let mut store = VectorStore::init("./my_vectors", 4)?;
//!
//!     let id = store.add_vector(
//!         vec![0.1, 0.2, 0.3, 0.4],
//!         json!({"doc": "example"}),
//!     )?;
//!     store.save()?;
//!
//!     // The index is rebuilt in memory from the records
//!     store.rebuild_index()?;
//!     let results = store.search(&[0.1, 0.2, 0.3, 0.4], 1)?;
//!     assert_eq!(results[0].0, id);
//!     Ok(())
//! }
//! ```
//!
//! ### Tuning the Graph
//!
//! ```rust
//! use miradb::prelude::*;
//!
//! let config = HnswConfig {
//!     m: 16,               // Connections per node (higher = better recall)
//!     m_max0: 32,          // Degree bound at layer 0
//!     ef_construction: 200, // Build-time beam width
//!     ef_search: 50,       // Search-time beam width
//!     seed: Some(42),      // Pin the layer RNG for reproducible builds
//! };
//!
//! let index = HnswIndex::new(128, 10_000, config);
//! # let _ = index;
//! ```
//!
//! ## Architecture
//!
//! MiraDB is organized into two library crates:
//!
//! - **`miradb-core`** — The engine: HNSW graph, record store, errors
//! - **`miradb`** — Main crate that re-exports everything
//!
//! A thin `miradb-cli` binary wraps the store for shell use.
//!
//! ## Distance Convention
//!
//! The index returns raw scores from its distance function (squared
//! Euclidean by default). Callers displaying true Euclidean distances take
//! the square root themselves.
//!
//! ## Thread Safety
//!
//! [`HnswIndex`] owns a single reader-writer lock over the whole graph:
//! `insert` excludes everything for its duration, searches share access
//! with each other. [`VectorStore`] is single-threaded; wrap it yourself if
//! you need sharing.

// Re-export everything from core
pub use miradb_core::*;
