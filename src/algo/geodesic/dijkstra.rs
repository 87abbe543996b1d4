//! Dijkstra's algorithm on the mesh edge graph.
//!
//! Computes shortest path distances along mesh edges. Queue ties are broken
//! by vertex index so that distances *and* predecessors are reproducible.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::mesh::{HalfEdgeMesh, VertexId};

use super::GeodesicResult;

/// Options for Dijkstra's algorithm.
#[derive(Debug, Clone, Default)]
pub struct DijkstraOptions {
    /// Whether to store predecessor information for path reconstruction.
    pub store_predecessors: bool,

    /// Maximum distance to explore. Vertices beyond this distance stay
    /// unreachable. Set to `None` for no limit.
    pub max_distance: Option<f64>,
}

impl DijkstraOptions {
    /// Enable predecessor storage for path reconstruction.
    pub fn with_predecessors(mut self, store: bool) -> Self {
        self.store_predecessors = store;
        self
    }

    /// Set maximum distance to explore.
    pub fn with_max_distance(mut self, max_dist: f64) -> Self {
        self.max_distance = Some(max_dist);
        self
    }
}

/// Entry in Dijkstra's priority queue.
#[derive(Debug, Clone, Copy)]
struct DijkstraEntry {
    vertex: usize,
    distance: f64,
}

impl PartialEq for DijkstraEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DijkstraEntry {}

impl PartialOrd for DijkstraEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DijkstraEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior; smaller index wins ties.
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

/// Compute shortest edge-path distances from a single source vertex.
pub fn dijkstra(mesh: &HalfEdgeMesh, source: VertexId, options: &DijkstraOptions) -> GeodesicResult {
    dijkstra_multiple(mesh, &[source], options)
}

/// Compute shortest edge-path distances from multiple source vertices.
///
/// All source vertices are treated as having distance 0, so each vertex ends
/// up with its distance to the *nearest* source.
///
/// # Arguments
///
/// * `mesh` - The input mesh
/// * `sources` - The source vertices (out-of-range ids are ignored)
/// * `options` - Algorithm options
pub fn dijkstra_multiple(
    mesh: &HalfEdgeMesh,
    sources: &[VertexId],
    options: &DijkstraOptions,
) -> GeodesicResult {
    let n = mesh.num_vertices();

    if n == 0 || sources.is_empty() {
        return GeodesicResult::new(vec![f64::INFINITY; n], None);
    }

    let mut distances = vec![f64::INFINITY; n];
    let mut predecessors: Option<Vec<Option<usize>>> = if options.store_predecessors {
        Some(vec![None; n])
    } else {
        None
    };

    let mut heap = BinaryHeap::new();
    for &source in sources {
        let idx = source.index();
        if idx < n {
            distances[idx] = 0.0;
            heap.push(DijkstraEntry {
                vertex: idx,
                distance: 0.0,
            });
        }
    }

    while let Some(DijkstraEntry { vertex: u, distance: dist_u }) = heap.pop() {
        // Stale entry
        if dist_u > distances[u] {
            continue;
        }

        for he in mesh.vertex_halfedges(VertexId::new(u)) {
            let v = mesh.dest(he).index();
            let new_dist = dist_u + mesh.edge_length(he);

            if options.max_distance.map_or(false, |max| new_dist > max) {
                continue;
            }

            if new_dist < distances[v] {
                distances[v] = new_dist;
                if let Some(ref mut preds) = predecessors {
                    preds[v] = Some(u);
                }
                heap.push(DijkstraEntry {
                    vertex: v,
                    distance: new_dist,
                });
            }
        }
    }

    GeodesicResult::new(distances, predecessors)
}
