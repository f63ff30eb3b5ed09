//! MiraDB Core - Embeddable Vector Database Engine
//!
//! This crate provides the core functionality for MiraDB, a small embeddable
//! vector database built around a Hierarchical Navigable Small World (HNSW)
//! graph index.
//!
//! # Features
//!
//! - **HNSW index** - Multi-layer proximity graph with incremental inserts
//!   and approximate k-NN search
//! - **Deterministic builds** - Seedable layer assignment and id tie-breaking
//!   make graphs and query results reproducible
//! - **JSON record store** - Vectors with opaque metadata persisted as a
//!   single human-readable document
//! - **Single-writer, multi-reader** - One insert at a time; searches run in
//!   parallel with each other
//!
//! # Quick Start
//!
//! ```rust
//! use miradb_core::{HnswConfig, HnswIndex};
//!
//! // Create an index for 4-dimensional vectors
//! let index = HnswIndex::new(4, 100, HnswConfig::default());
//!
//! // Insert vectors with caller-supplied labels
//! index.insert(vec![0.1, 0.2, 0.3, 0.4], 1).unwrap();
//! index.insert(vec![0.9, 0.8, 0.7, 0.6], 2).unwrap();
//!
//! // Search for the nearest neighbours
//! let results = index.search(&[0.1, 0.2, 0.3, 0.4], 1, None).unwrap();
//! assert_eq!(results[0].label, 1);
//! ```

mod distance;
mod error;
mod index;
mod store;
mod vector;

pub use distance::{euclidean, squared_euclidean, DistanceFn};
pub use error::{Error, Result};
pub use index::hnsw::{HnswConfig, HnswIndex, InternalId, SearchResult};
pub use store::{Record, VectorStore};
pub use vector::{Vector, VectorId};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::{
        Error, HnswConfig, HnswIndex, InternalId, Record, Result, SearchResult, Vector, VectorId,
        VectorStore,
    };
}
