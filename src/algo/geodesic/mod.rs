//! Shortest paths along mesh edges.
//!
//! The cylinder map cuts its angular seam along a shortest edge path from one
//! boundary loop to the other. This module provides the graph search that
//! finds it.
//!
//! # Example
//!
//! ```
//! use tubemap::algo::geodesic::{dijkstra_multiple, DijkstraOptions};
//! use tubemap::mesh::{build_tube, VertexId};
//!
//! let tube = build_tube(4, 8, 1.0, 3.0).unwrap();
//! let ring0: Vec<VertexId> = (0..8).map(VertexId::new).collect();
//!
//! let result = dijkstra_multiple(&tube, &ring0, &DijkstraOptions::default().with_predecessors(true));
//! let path = result.path_to(VertexId::new(24)).unwrap();
//! assert_eq!(path.len(), 4);
//! ```

mod dijkstra;

pub use dijkstra::{dijkstra, dijkstra_multiple, DijkstraOptions};

use crate::mesh::VertexId;

/// Result of a shortest-path search.
///
/// Contains distances from the source vertex/vertices to all other vertices,
/// and optionally predecessor information for path reconstruction.
#[derive(Debug, Clone)]
pub struct GeodesicResult {
    /// Distance from source(s) to each vertex.
    /// `f64::INFINITY` if the vertex is unreachable.
    distances: Vec<f64>,

    /// Predecessor vertex for each vertex (for path reconstruction).
    /// `None` if predecessors weren't computed or vertex is a source/unreachable.
    predecessors: Option<Vec<Option<usize>>>,
}

impl GeodesicResult {
    pub(crate) fn new(distances: Vec<f64>, predecessors: Option<Vec<Option<usize>>>) -> Self {
        Self {
            distances,
            predecessors,
        }
    }

    /// Get the distance to a vertex.
    ///
    /// Returns `f64::INFINITY` if the vertex is unreachable from the source(s).
    #[inline]
    pub fn distance(&self, v: VertexId) -> f64 {
        self.distances[v.index()]
    }

    /// Get all distances as a slice.
    #[inline]
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Get the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Check if a vertex is reachable from the source(s).
    #[inline]
    pub fn is_reachable(&self, v: VertexId) -> bool {
        self.distances[v.index()].is_finite()
    }

    /// Count the number of reachable vertices.
    pub fn reachable_count(&self) -> usize {
        self.distances.iter().filter(|d| d.is_finite()).count()
    }

    /// The reachable candidate with the smallest distance.
    ///
    /// Ties go to the smallest vertex index, so the choice does not depend on
    /// the order of `candidates`.
    pub fn closest(&self, candidates: &[VertexId]) -> Option<(VertexId, f64)> {
        candidates
            .iter()
            .map(|&v| (v, self.distance(v)))
            .filter(|(_, d)| d.is_finite())
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
    }

    /// Reconstruct the shortest path from a source to the given vertex.
    ///
    /// Returns `None` if:
    /// - Predecessors weren't stored (use `DijkstraOptions::with_predecessors(true)`)
    /// - The vertex is unreachable
    ///
    /// The returned path includes both the source and target vertices.
    pub fn path_to(&self, target: VertexId) -> Option<Vec<VertexId>> {
        let predecessors = self.predecessors.as_ref()?;

        if !self.distances[target.index()].is_finite() {
            return None;
        }

        let mut path = Vec::new();
        let mut current = target.index();

        loop {
            path.push(VertexId::new(current));

            match predecessors[current] {
                Some(pred) => current = pred,
                None => break, // Reached a source
            }

            if path.len() > self.distances.len() {
                return None;
            }
        }

        path.reverse();
        Some(path)
    }

    /// Iterate over all vertices with their distances.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, f64)> + '_ {
        self.distances
            .iter()
            .enumerate()
            .map(|(i, &d)| (VertexId::new(i), d))
    }
}
