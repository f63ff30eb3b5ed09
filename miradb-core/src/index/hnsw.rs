//! HNSW (Hierarchical Navigable Small World) graph index.
//!
//! HNSW builds a multi-layer proximity graph where:
//! - Layer 0 contains all vectors with dense connections
//! - Higher layers contain exponentially fewer vectors (like a skip list)
//! - Search starts at the top layer and greedily descends to layer 0
//!
//! Nodes live in a contiguous owned array and refer to each other by dense
//! internal indices; all adjacency is index-based. The whole graph sits
//! behind a single reader-writer lock: one insert at a time, searches in
//! parallel with each other.
//!
//! # References
//!
//! - Malkov & Yashunin (2018): "Efficient and robust approximate nearest
//!   neighbor search using HNSW graphs"

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::distance::{squared_euclidean, DistanceFn};
use crate::error::{Error, Result};
use crate::vector::{Vector, VectorId};

use super::visited::VisitedSet;

/// Dense zero-based node identifier, assigned in insertion order.
///
/// Valid only for the lifetime of one index instance; ids are never reused.
pub type InternalId = u32;

/// Hard ceiling on the layer a node can be assigned to. Real heights are
/// typically <= 4; the cap keeps adjacency vectors bounded.
const MAX_LAYER: usize = 16;

/// Configuration for HNSW index.
#[derive(Debug, Clone)]
pub struct HnswConfig {
    /// Target number of connections per node on layers above 0.
    /// Higher = better recall, more memory. Typical: 16-64.
    pub m: usize,
    /// Hard degree bound at layer 0 (usually 2*M).
    pub m_max0: usize,
    /// Beam width during construction. Higher = better graph quality,
    /// slower build. Typical: 100-200.
    pub ef_construction: usize,
    /// Default beam width during search. Can be overridden per-query.
    /// Typical: 50-200.
    pub ef_search: usize,
    /// Seed for the layer-assignment RNG. `None` seeds from OS entropy;
    /// pin it for reproducible builds.
    pub seed: Option<u64>,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            m: 16,
            m_max0: 32,
            ef_construction: 200,
            ef_search: 50,
            seed: None,
        }
    }
}

impl HnswConfig {
    /// Creates config with the specified M parameter and `m_max0 = 2*M`.
    pub fn with_m(m: usize) -> Self {
        Self {
            m,
            m_max0: m * 2,
            ..Default::default()
        }
    }

    /// Pins the layer-assignment RNG seed. Chainable.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Degree bound for a layer: `m_max0` at layer 0, `m` above.
    #[inline]
    fn max_degree(&self, layer: usize) -> usize {
        if layer == 0 {
            self.m_max0
        } else {
            self.m
        }
    }
}

/// A node in the HNSW graph.
#[derive(Debug, Clone)]
struct HnswNode {
    /// Owned copy of the vector data.
    vector: Vector,
    /// Caller-supplied external label.
    label: VectorId,
    /// Neighbors at each layer. `neighbors[layer]` = connected internal
    /// ids; the node's assigned layer is `neighbors.len() - 1`.
    neighbors: Vec<Vec<InternalId>>,
}

impl HnswNode {
    fn new(vector: Vector, label: VectorId, layer: usize) -> Self {
        Self {
            vector,
            label,
            neighbors: vec![Vec::new(); layer + 1],
        }
    }
}

/// A candidate during search, ordered closest-first (min-heap).
///
/// Distance ties resolve to the smaller internal id so traversal order is
/// deterministic even when several nodes share a distance to the query.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: InternalId,
    distance: f32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.id == other.id
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap: lower distance = higher priority,
        // then smaller id.
        other
            .distance
            .partial_cmp(&self.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// A result-set entry ordered furthest-first (max-heap).
///
/// On distance ties the larger id counts as further, so evictions keep the
/// smaller ids and mirror [`Candidate`]'s tie-breaking.
#[derive(Debug, Clone, Copy)]
struct FurthestCandidate {
    id: InternalId,
    distance: f32,
}

impl PartialEq for FurthestCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.id == other.id
    }
}

impl Eq for FurthestCandidate {}

impl PartialOrd for FurthestCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FurthestCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Search result from the index: external label plus raw distance score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    /// Caller-supplied label of the matched vector.
    pub label: VectorId,
    /// Raw distance from the query (squared Euclidean by default).
    pub distance: f32,
}

/// Mutable graph state guarded by the index lock: node storage, adjacency,
/// entry point, current top layer, and the private layer RNG.
struct Graph {
    nodes: Vec<HnswNode>,
    entry_point: Option<InternalId>,
    top_layer: usize,
    rng: StdRng,
}

impl Graph {
    #[inline]
    fn distance(&self, dist: DistanceFn, query: &[f32], id: InternalId) -> f32 {
        dist(query, self.nodes[id as usize].vector.as_slice())
    }

    /// Draws a layer for a new node: geometric decay with rate 1/M,
    /// capped at [`MAX_LAYER`].
    fn random_layer(&mut self, ml: f64) -> usize {
        let mut layer = 0;
        while self.rng.gen::<f64>() < ml && layer < MAX_LAYER {
            layer += 1;
        }
        layer
    }

    /// Bounded best-first search over a single layer.
    ///
    /// Maintains a candidate min-heap (frontier) and a result max-heap
    /// capped at `ef`, and stops once the nearest open candidate cannot
    /// improve the result set. With `ef = 1` this degenerates to the greedy
    /// walk used while descending upper layers.
    ///
    /// Returns up to `ef` nodes, ascending by `(distance, id)`.
    fn search_layer(
        &self,
        dist: DistanceFn,
        query: &[f32],
        entry: InternalId,
        ef: usize,
        layer: usize,
        visited: &mut VisitedSet,
    ) -> Vec<Candidate> {
        let mut candidates: BinaryHeap<Candidate> = BinaryHeap::new();
        let mut results: BinaryHeap<FurthestCandidate> = BinaryHeap::new();

        visited.reset(self.nodes.len());
        visited.mark(entry);

        let d0 = self.distance(dist, query, entry);
        candidates.push(Candidate {
            id: entry,
            distance: d0,
        });
        results.push(FurthestCandidate {
            id: entry,
            distance: d0,
        });

        while let Some(closest) = candidates.pop() {
            let furthest = results
                .peek()
                .map(|f| f.distance)
                .unwrap_or(f32::INFINITY);
            // No remaining candidate can improve the result set.
            if closest.distance > furthest {
                break;
            }

            let node = &self.nodes[closest.id as usize];
            // Nodes assigned below `layer` carry no adjacency there.
            if layer >= node.neighbors.len() {
                continue;
            }
            for &neighbor in &node.neighbors[layer] {
                if !visited.mark(neighbor) {
                    continue;
                }
                let d = self.distance(dist, query, neighbor);
                let furthest = results
                    .peek()
                    .map(|f| f.distance)
                    .unwrap_or(f32::INFINITY);
                if results.len() < ef || d < furthest {
                    candidates.push(Candidate {
                        id: neighbor,
                        distance: d,
                    });
                    results.push(FurthestCandidate {
                        id: neighbor,
                        distance: d,
                    });
                    if results.len() > ef {
                        results.pop();
                    }
                }
            }
        }

        let mut out: Vec<Candidate> = results
            .into_iter()
            .map(|f| Candidate {
                id: f.id,
                distance: f.distance,
            })
            .collect();
        out.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        out
    }

    /// Re-derives a node's adjacency at `layer`, keeping the `max_degree`
    /// closest of its current friends. Reverse edges of dropped friends are
    /// removed in the same step so layer symmetry survives pruning.
    fn prune_connections(&mut self, dist: DistanceFn, id: InternalId, layer: usize, max_degree: usize) {
        if self.nodes[id as usize].neighbors[layer].len() <= max_degree {
            return;
        }

        let origin = self.nodes[id as usize].vector.as_slice().to_vec();
        let mut ranked: Vec<Candidate> = self.nodes[id as usize].neighbors[layer]
            .iter()
            .map(|&friend| Candidate {
                id: friend,
                distance: dist(&origin, self.nodes[friend as usize].vector.as_slice()),
            })
            .collect();
        ranked.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        for dropped in &ranked[max_degree..] {
            self.nodes[dropped.id as usize].neighbors[layer].retain(|&n| n != id);
        }
        self.nodes[id as usize].neighbors[layer] =
            ranked[..max_degree].iter().map(|c| c.id).collect();
    }
}

/// HNSW index for approximate nearest neighbor search.
///
/// The index owns all node storage and adjacency; vector data is copied on
/// insert. `insert` takes the write lock for its full duration, searches
/// take the read lock and may run concurrently with each other.
///
/// # Example
///
/// ```
/// use miradb_core::{HnswConfig, HnswIndex};
///
/// let index = HnswIndex::new(3, 16, HnswConfig::default());
///
/// index.insert(vec![1.0, 0.0, 0.0], 1).unwrap();
/// index.insert(vec![0.9, 0.1, 0.0], 2).unwrap();
/// index.insert(vec![0.0, 1.0, 0.0], 3).unwrap();
///
/// let results = index.search(&[1.0, 0.0, 0.0], 2, None).unwrap();
/// assert_eq!(results[0].label, 1); // Exact match
/// ```
pub struct HnswIndex {
    /// Vector dimension, fixed at creation.
    dimension: usize,
    /// Geometric parameters.
    config: HnswConfig,
    /// Layer-assignment multiplier, 1/ln(M).
    ml: f64,
    /// Pairwise distance function.
    dist: DistanceFn,
    /// Graph state behind the single coarse lock.
    graph: RwLock<Graph>,
}

impl HnswIndex {
    /// Creates a new empty HNSW index for `dimension`-element vectors.
    ///
    /// `capacity_hint` pre-reserves node storage; it is not a hard limit.
    pub fn new(dimension: usize, capacity_hint: usize, config: HnswConfig) -> Self {
        let ml = 1.0 / (config.m as f64).ln();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            dimension,
            ml,
            dist: squared_euclidean,
            graph: RwLock::new(Graph {
                nodes: Vec::with_capacity(capacity_hint),
                entry_point: None,
                top_layer: 0,
                rng,
            }),
            config,
        }
    }

    /// Replaces the distance function. Chainable; intended for callers
    /// that want a metric other than the squared-Euclidean default.
    pub fn with_distance_fn(mut self, dist: DistanceFn) -> Self {
        self.dist = dist;
        self
    }

    /// Returns the number of vectors in the index.
    pub fn len(&self) -> usize {
        self.graph.read().nodes.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.read().nodes.is_empty()
    }

    /// Returns the dimension of vectors in this index.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the current entry point, if any vector has been inserted.
    pub fn entry_point(&self) -> Option<InternalId> {
        self.graph.read().entry_point
    }

    /// Returns the highest layer among all inserted nodes.
    pub fn top_layer(&self) -> usize {
        self.graph.read().top_layer
    }

    /// Returns a copy of a node's adjacency list at `layer`.
    ///
    /// `None` when `id` is out of range or the node's assigned layer is
    /// below `layer`. Used by tests and visualizers.
    pub fn neighbors_of(&self, id: InternalId, layer: usize) -> Option<Vec<InternalId>> {
        let graph = self.graph.read();
        graph
            .nodes
            .get(id as usize)
            .and_then(|node| node.neighbors.get(layer))
            .cloned()
    }

    /// Inserts a vector with the given external label and returns the
    /// internal id just assigned.
    ///
    /// Ids are dense and assigned in insertion order. Fails with
    /// [`Error::DimensionMismatch`] when the vector length differs from the
    /// index dimension, without mutating any state.
    pub fn insert<V: Into<Vector>>(&self, vector: V, label: VectorId) -> Result<InternalId> {
        let vector = vector.into();
        if vector.dimension() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                got: vector.dimension(),
            });
        }
        let query = vector.as_slice().to_vec();

        let mut graph = self.graph.write();
        let id = InternalId::try_from(graph.nodes.len()).map_err(|_| Error::CapacityExhausted)?;
        let layer = graph.random_layer(self.ml);

        // First node becomes the entry point; no edges to create.
        let Some(mut ep) = graph.entry_point else {
            graph.nodes.push(HnswNode::new(vector, label, layer));
            graph.entry_point = Some(id);
            graph.top_layer = layer;
            return Ok(id);
        };

        let top = graph.top_layer;
        let mut visited = VisitedSet::new(graph.nodes.len() + 1);

        // Zoom in: greedy single-nearest walk down to the first layer the
        // new node will link at.
        for lc in (layer + 1..=top).rev() {
            let nearest = graph.search_layer(self.dist, &query, ep, 1, lc, &mut visited);
            if let Some(best) = nearest.first() {
                ep = best.id;
            }
        }

        // The node is staged with empty adjacency before any back-edge is
        // published; nothing fallible runs past this point.
        graph.nodes.push(HnswNode::new(vector, label, layer));

        for lc in (0..=layer.min(top)).rev() {
            let found = graph.search_layer(
                self.dist,
                &query,
                ep,
                self.config.ef_construction,
                lc,
                &mut visited,
            );

            // SELECT-NEIGHBORS-SIMPLE: the M closest candidates, ties
            // already resolved to smaller ids by search_layer's ordering.
            let selected: Vec<InternalId> =
                found.iter().take(self.config.m).map(|c| c.id).collect();
            let max_degree = self.config.max_degree(lc);

            graph.nodes[id as usize].neighbors[lc] = selected.clone();
            for &neighbor in &selected {
                graph.nodes[neighbor as usize].neighbors[lc].push(id);
                if graph.nodes[neighbor as usize].neighbors[lc].len() > max_degree {
                    graph.prune_connections(self.dist, neighbor, lc, max_degree);
                }
            }
            // The layer below reuses this layer's entry point; linking does
            // not advance it.
        }

        if layer > graph.top_layer {
            graph.top_layer = layer;
            graph.entry_point = Some(id);
        }

        Ok(id)
    }

    /// Searches for the `k` nearest neighbors of `query`.
    ///
    /// `ef` is the beam width at layer 0 and defaults to the configured
    /// `ef_search`; the effective beam is never below `k`. An empty index
    /// yields an empty result, a wrong query length an error.
    ///
    /// Results are sorted ascending by distance and carry the raw score of
    /// the index's distance function; callers wanting a true Euclidean
    /// metric take the square root themselves.
    pub fn search(&self, query: &[f32], k: usize, ef: Option<usize>) -> Result<Vec<SearchResult>> {
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            });
        }

        let graph = self.graph.read();
        let Some(mut ep) = graph.entry_point else {
            return Ok(Vec::new());
        };

        let ef = ef.unwrap_or(self.config.ef_search).max(k).max(1);
        let mut visited = VisitedSet::new(graph.nodes.len());

        // Same zoom-in as insertion: greedy descent to layer 1.
        for lc in (1..=graph.top_layer).rev() {
            let nearest = graph.search_layer(self.dist, query, ep, 1, lc, &mut visited);
            if let Some(best) = nearest.first() {
                ep = best.id;
            }
        }

        let found = graph.search_layer(self.dist, query, ep, ef, 0, &mut visited);
        Ok(found
            .into_iter()
            .take(k)
            .map(|c| SearchResult {
                label: graph.nodes[c.id as usize].label,
                distance: c.distance,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_points(n: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect())
            .collect()
    }

    fn build_index(points: &[Vec<f32>], config: HnswConfig) -> HnswIndex {
        let dim = points.first().map(|p| p.len()).unwrap_or(0);
        let index = HnswIndex::new(dim, points.len().max(1), config);
        for (i, point) in points.iter().enumerate() {
            index.insert(point.clone(), i as u64).unwrap();
        }
        index
    }

    fn brute_force_nearest(points: &[Vec<f32>], query: &[f32]) -> (u64, f32) {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as u64, squared_euclidean(query, p)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then(a.0.cmp(&b.0)))
            .unwrap()
    }

    #[test]
    fn test_new_index() {
        let index = HnswIndex::new(128, 1000, HnswConfig::default());
        assert!(index.is_empty());
        assert_eq!(index.dimension(), 128);
        assert_eq!(index.entry_point(), None);
    }

    #[test]
    fn test_search_empty_index() {
        let index = HnswIndex::new(4, 1, HnswConfig::default());
        let results = index.search(&[0.0, 0.0, 0.0, 0.0], 5, Some(10)).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_single_point() {
        let index = HnswIndex::new(4, 1, HnswConfig::default());
        index.insert(vec![1.0, 2.0, 3.0, 4.0], 7).unwrap();

        let results = index.search(&[1.0, 2.0, 3.0, 4.0], 1, None).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, 7);
        assert_eq!(results[0].distance, 0.0);
    }

    #[test]
    fn test_insert_returns_dense_ids() {
        let index = HnswIndex::new(2, 4, HnswConfig::default());
        assert_eq!(index.insert(vec![0.0, 0.0], 10).unwrap(), 0);
        assert_eq!(index.insert(vec![1.0, 0.0], 20).unwrap(), 1);
        assert_eq!(index.insert(vec![0.0, 1.0], 30).unwrap(), 2);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_insert_dimension_mismatch() {
        let index = HnswIndex::new(3, 1, HnswConfig::default());
        let result = index.insert(vec![1.0, 2.0], 1);
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
        // A failed insert leaves the graph untouched.
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_dimension_mismatch() {
        let index = HnswIndex::new(3, 1, HnswConfig::default());
        index.insert(vec![1.0, 2.0, 3.0], 1).unwrap();
        let result = index.search(&[1.0, 2.0], 1, None);
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_entry_point_on_top_layer() {
        let points = random_points(200, 4, 11);
        let index = build_index(&points, HnswConfig::with_m(8).with_seed(11));

        let entry = index.entry_point().unwrap();
        // The entry point's adjacency extends to the top layer.
        assert!(index.neighbors_of(entry, index.top_layer()).is_some());
    }

    #[test]
    fn test_two_clusters() {
        let index = HnswIndex::new(2, 20, HnswConfig::default().with_seed(3));
        let mut rng = StdRng::seed_from_u64(42);
        for label in 1..=10u64 {
            let v: Vec<f32> = vec![rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5)];
            index.insert(v, label).unwrap();
        }
        for label in 11..=20u64 {
            let v: Vec<f32> = vec![
                100.0 + rng.gen_range(-0.5..0.5),
                100.0 + rng.gen_range(-0.5..0.5),
            ];
            index.insert(v, label).unwrap();
        }

        let results = index.search(&[0.1, 0.1], 3, Some(50)).unwrap();
        assert_eq!(results.len(), 3);
        for result in &results {
            assert!(
                (1..=10).contains(&result.label),
                "label {} is not in the near cluster",
                result.label
            );
        }
    }

    #[test]
    fn test_duplicate_vectors() {
        let index = HnswIndex::new(2, 2, HnswConfig::default());
        index.insert(vec![1.0, 1.0], 10).unwrap();
        index.insert(vec![1.0, 1.0], 11).unwrap();

        let results = index.search(&[1.0, 1.0], 2, None).unwrap();
        assert_eq!(results.len(), 2);
        let mut labels: Vec<u64> = results.iter().map(|r| r.label).collect();
        labels.sort_unstable();
        assert_eq!(labels, vec![10, 11]);
        assert!(results.iter().all(|r| r.distance == 0.0));
    }

    #[test]
    fn test_results_sorted_ascending() {
        let points = random_points(100, 8, 5);
        let index = build_index(&points, HnswConfig::with_m(8).with_seed(5));

        let query = vec![0.25; 8];
        let results = index.search(&query, 10, Some(64)).unwrap();
        assert!(!results.is_empty());
        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
        assert!(results.iter().all(|r| r.distance >= 0.0));
    }

    #[test]
    fn test_exact_recall_small() {
        // For small N with ef = N the 1-NN matches brute force.
        let points = random_points(50, 4, 77);
        let index = build_index(&points, HnswConfig::default().with_seed(77));

        let queries = random_points(20, 4, 78);
        for query in &queries {
            let results = index.search(query, 1, Some(50)).unwrap();
            let (bf_label, bf_dist) = brute_force_nearest(&points, query);
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].label, bf_label);
            assert!((results[0].distance - bf_dist).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rebuild_parity() {
        // Two indices built with the same seed and insertion order agree on
        // every adjacency list and every query result.
        let points = random_points(100, 8, 9);
        let queries = random_points(20, 8, 10);
        let config = HnswConfig::with_m(8).with_seed(1234);

        let a = build_index(&points, config.clone());
        let b = build_index(&points, config);

        assert_eq!(a.top_layer(), b.top_layer());
        assert_eq!(a.entry_point(), b.entry_point());
        for id in 0..points.len() as InternalId {
            for layer in 0..=a.top_layer() {
                assert_eq!(
                    a.neighbors_of(id, layer),
                    b.neighbors_of(id, layer),
                    "adjacency diverged at node {} layer {}",
                    id,
                    layer
                );
            }
        }

        for query in &queries {
            let ra = a.search(query, 5, Some(32)).unwrap();
            let rb = b.search(query, 5, Some(32)).unwrap();
            assert_eq!(ra, rb);
        }
    }

    #[test]
    fn test_degree_bound_under_load() {
        let config = HnswConfig {
            m: 8,
            m_max0: 16,
            ef_construction: 32,
            ef_search: 50,
            seed: Some(6),
        };
        let points = random_points(10_000, 4, 6);
        let index = build_index(&points, config);

        for id in 0..points.len() as InternalId {
            let mut layer = 0;
            while let Some(neighbors) = index.neighbors_of(id, layer) {
                let bound = if layer == 0 { 16 } else { 8 };
                assert!(
                    neighbors.len() <= bound,
                    "node {} layer {} has degree {}",
                    id,
                    layer,
                    neighbors.len()
                );
                layer += 1;
            }
        }
    }

    #[test]
    fn test_edges_symmetric_between_inserts() {
        let points = random_points(300, 4, 21);
        let index = build_index(&points, HnswConfig::with_m(6).with_seed(21));

        for id in 0..points.len() as InternalId {
            let mut layer = 0;
            while let Some(neighbors) = index.neighbors_of(id, layer) {
                for neighbor in neighbors {
                    let reverse = index.neighbors_of(neighbor, layer).unwrap();
                    assert!(
                        reverse.contains(&id),
                        "edge {} -> {} at layer {} has no reverse",
                        id,
                        neighbor,
                        layer
                    );
                }
                layer += 1;
            }
        }
    }

    #[test]
    fn test_edges_are_distinct_and_not_self() {
        let points = random_points(300, 4, 22);
        let index = build_index(&points, HnswConfig::with_m(6).with_seed(22));

        for id in 0..points.len() as InternalId {
            let mut layer = 0;
            while let Some(neighbors) = index.neighbors_of(id, layer) {
                assert!(!neighbors.contains(&id), "self-edge at node {}", id);
                let mut sorted = neighbors.clone();
                sorted.sort_unstable();
                sorted.dedup();
                assert_eq!(sorted.len(), neighbors.len(), "duplicate edge at node {}", id);
                layer += 1;
            }
        }
    }

    #[test]
    fn test_layer_monotonicity() {
        // A node with an edge at layer L > 0 has at least one edge at L-1.
        let points = random_points(400, 4, 33);
        let index = build_index(&points, HnswConfig::with_m(6).with_seed(33));

        for id in 0..points.len() as InternalId {
            let mut layer = 1;
            while let Some(neighbors) = index.neighbors_of(id, layer) {
                if !neighbors.is_empty() {
                    let below = index.neighbors_of(id, layer - 1).unwrap();
                    assert!(
                        !below.is_empty(),
                        "node {} has edges at layer {} but none at {}",
                        id,
                        layer,
                        layer - 1
                    );
                }
                layer += 1;
            }
        }
    }

    #[test]
    fn test_recall_vs_brute_force() {
        let points = random_points(200, 8, 40);
        let config = HnswConfig {
            m: 16,
            m_max0: 32,
            ef_construction: 200,
            ef_search: 100,
            seed: Some(40),
        };
        let index = build_index(&points, config);

        let queries = random_points(10, 8, 41);
        let k = 10;
        let mut total_recall = 0.0;

        for query in &queries {
            let hnsw: std::collections::HashSet<u64> = index
                .search(query, k, Some(200))
                .unwrap()
                .iter()
                .map(|r| r.label)
                .collect();

            let mut exact: Vec<(u64, f32)> = points
                .iter()
                .enumerate()
                .map(|(i, p)| (i as u64, squared_euclidean(query, p)))
                .collect();
            exact.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
            let exact: std::collections::HashSet<u64> =
                exact.iter().take(k).map(|(label, _)| *label).collect();

            total_recall += hnsw.intersection(&exact).count() as f64 / k as f64;
        }

        let avg_recall = total_recall / queries.len() as f64;
        assert!(
            avg_recall >= 0.9,
            "average recall {:.2} is below threshold",
            avg_recall
        );
    }
}
