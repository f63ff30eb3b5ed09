//! Index implementations.

pub mod hnsw;
mod visited;
