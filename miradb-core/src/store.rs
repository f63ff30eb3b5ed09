//! JSON-backed record store around the HNSW index.
//!
//! The store owns the durable truth: a mapping `external id -> (vector,
//! metadata)` persisted as a single human-readable JSON document. The HNSW
//! index is purely in-memory and derived; after any record mutation the
//! store must be asked for an explicit [`VectorStore::rebuild_index`]
//! before searches reflect the change.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::index::hnsw::{HnswConfig, HnswIndex};
use crate::vector::{Vector, VectorId};

/// A stored record: external id, vector data, and opaque metadata.
///
/// Metadata is any JSON value; the store and the index never interpret it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: VectorId,
    pub vec: Vector,
    pub metadata: Value,
}

/// On-disk document layout: `{ dim, nextId, vectors: [...] }`.
#[derive(Debug, Serialize, Deserialize)]
struct StoreDocument {
    dim: usize,
    #[serde(rename = "nextId")]
    next_id: u64,
    #[serde(default)]
    vectors: Vec<Record>,
}

/// A vector store persisted as one JSON document, searchable through an
/// in-memory HNSW index.
///
/// Records are kept ordered by external id, so index rebuilds assign
/// internal ids in ascending-id order deterministically.
///
/// # Example
///
/// ```no_run
/// use miradb_core::VectorStore;
/// use serde_json::json;
///
/// let mut store = VectorStore::init("./my_vectors", 4)?;
/// let id = store.add_vector(vec![1.0, 2.0, 3.0, 4.0], json!({"doc": "a"}))?;
/// store.save()?;
///
/// store.rebuild_index()?;
/// let results = store.search(&[1.0, 2.0, 3.0, 4.0], 1)?;
/// assert_eq!(results[0].0, id);
/// # miradb_core::Result::Ok(())
/// ```
pub struct VectorStore {
    /// Path of the persisted document (`<base>.json`).
    data_path: PathBuf,
    /// Vector dimensionality; 0 until the store is initialised.
    dim: usize,
    /// Next external id to hand out. Ids start at 1.
    next_id: u64,
    /// All records, ordered by external id.
    records: BTreeMap<VectorId, Record>,
    /// Derived index; `None` until the first rebuild.
    index: Option<HnswIndex>,
    /// Side table from the last rebuild: internal id -> external id.
    id_map: Vec<VectorId>,
}

impl VectorStore {
    /// Initialises a new store at `path` with the given dimensionality.
    ///
    /// The document lands at `<path>.json`. Fails with
    /// [`Error::AlreadyExists`] when that file is already present.
    pub fn init<P: AsRef<Path>>(path: P, dim: usize) -> Result<Self> {
        let data_path = data_path_for(path.as_ref());
        if data_path.exists() {
            return Err(Error::AlreadyExists(data_path.display().to_string()));
        }

        let mut store = Self {
            data_path,
            dim,
            next_id: 1,
            records: BTreeMap::new(),
            index: None,
            id_map: Vec::new(),
        };
        store.rebuild_index()?;
        store.save()?;
        Ok(store)
    }

    /// Opens the store at `path`, loading the document if it exists.
    ///
    /// A missing file yields an empty, uninitialised store (dimension 0).
    /// The index is not built here; call [`Self::rebuild_index`] before
    /// searching.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data_path = data_path_for(path.as_ref());
        let mut store = Self {
            data_path: data_path.clone(),
            dim: 0,
            next_id: 0,
            records: BTreeMap::new(),
            index: None,
            id_map: Vec::new(),
        };

        if !data_path.exists() {
            return Ok(store);
        }

        let content = fs::read_to_string(&data_path).map_err(|e| Error::Io(e.to_string()))?;
        let document: StoreDocument =
            serde_json::from_str(&content).map_err(|e| Error::Corrupt(e.to_string()))?;

        store.dim = document.dim;
        store.next_id = document.next_id;
        for record in document.vectors {
            if record.vec.dimension() != document.dim {
                return Err(Error::Corrupt(format!(
                    "record {} has dimension {}, expected {}",
                    record.id,
                    record.vec.dimension(),
                    document.dim
                )));
            }
            store.records.insert(record.id, record);
        }
        tracing::debug!(
            path = %store.data_path.display(),
            records = store.records.len(),
            "store loaded"
        );
        Ok(store)
    }

    /// Writes the current records back to the data file.
    pub fn save(&self) -> Result<()> {
        let document = StoreDocument {
            dim: self.dim,
            next_id: self.next_id,
            vectors: self.records.values().cloned().collect(),
        };
        let content =
            serde_json::to_string_pretty(&document).map_err(|e| Error::Io(e.to_string()))?;
        fs::write(&self.data_path, content).map_err(|e| Error::Io(e.to_string()))?;
        tracing::debug!(path = %self.data_path.display(), "store saved");
        Ok(())
    }

    /// Adds a vector with metadata and returns its external id.
    ///
    /// Does not touch the live index; the change becomes searchable after
    /// the next [`Self::rebuild_index`].
    pub fn add_vector(&mut self, vec: Vec<f32>, metadata: Value) -> Result<VectorId> {
        if vec.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                got: vec.len(),
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        self.records.insert(
            id,
            Record {
                id,
                vec: Vector::from_vec(vec),
                metadata,
            },
        );
        Ok(id)
    }

    /// Returns the record with the given external id.
    pub fn get(&self, id: VectorId) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Replaces a record's vector and metadata.
    pub fn update_vector(&mut self, id: VectorId, vec: Vec<f32>, metadata: Value) -> Result<()> {
        if !self.records.contains_key(&id) {
            return Err(Error::NotFound(id));
        }
        if vec.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                got: vec.len(),
            });
        }

        self.records.insert(
            id,
            Record {
                id,
                vec: Vector::from_vec(vec),
                metadata,
            },
        );
        Ok(())
    }

    /// Removes a record.
    pub fn delete_vector(&mut self, id: VectorId) -> Result<()> {
        self.records
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::NotFound(id))
    }

    /// Rebuilds the in-memory index from scratch.
    ///
    /// Creates a fresh index with capacity for the current record count,
    /// inserts records in ascending-id order with their position as the
    /// index label, and refreshes the internal-to-external side table.
    pub fn rebuild_index(&mut self) -> Result<()> {
        if self.records.is_empty() {
            tracing::warn!("rebuilding index with 0 vectors");
        }

        let capacity = self.records.len().max(1);
        let index = HnswIndex::new(self.dim, capacity, HnswConfig::default());
        let mut id_map = Vec::with_capacity(self.records.len());

        for (position, record) in self.records.values().enumerate() {
            index.insert(record.vec.clone(), position as u64)?;
            id_map.push(record.id);
        }

        tracing::info!(vectors = self.records.len(), dim = self.dim, "index rebuilt");
        self.index = Some(index);
        self.id_map = id_map;
        Ok(())
    }

    /// Searches the index for the `k` nearest records.
    ///
    /// Returns `(external id, raw distance)` pairs ascending by distance.
    /// Results reflect the records as of the last rebuild; fails with
    /// [`Error::IndexNotBuilt`] when no rebuild has happened yet.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(VectorId, f32)>> {
        let index = self.index.as_ref().ok_or(Error::IndexNotBuilt)?;
        let results = index.search(query, k, None)?;
        Ok(results
            .into_iter()
            .filter_map(|r| {
                self.id_map
                    .get(r.label as usize)
                    .map(|&external| (external, r.distance))
            })
            .collect())
    }

    /// Returns the vector dimensionality (0 before initialisation).
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the path of the persisted document.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }
}

/// The document lives next to the base path with a `.json` suffix.
fn data_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".json");
    PathBuf::from(name)
}
