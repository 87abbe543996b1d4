//! Open-boundary loop extraction.
//!
//! The boundary of a mesh is the set of edges that belong to exactly one
//! triangle. On a manifold surface these edges form disjoint closed loops;
//! a tube has two, a disk has one, a closed surface has none.
//!
//! Loops are returned in a deterministic order: each walk starts at the
//! smallest unvisited boundary vertex and first steps along the boundary
//! half-edge leaving it, so loops come out sorted by their smallest vertex.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, info};
use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, VertexId};

/// An ordered closed walk of boundary vertices.
///
/// Consecutive vertices (and the last and first) share a boundary edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    vertices: Vec<VertexId>,
}

impl BoundaryLoop {
    /// The loop's vertices in walk order.
    #[inline]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Number of vertices (and edges) in the loop.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the loop has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Whether `v` lies on this loop.
    pub fn contains(&self, v: VertexId) -> bool {
        self.vertices.contains(&v)
    }

    /// Mean position of the loop's vertices.
    pub fn centroid(&self, mesh: &HalfEdgeMesh) -> Point3<f64> {
        let sum = self
            .vertices
            .iter()
            .fold(nalgebra::Vector3::zeros(), |acc, &v| acc + mesh.position(v).coords);
        Point3::from(sum / self.vertices.len().max(1) as f64)
    }

    /// Total edge length around the loop.
    pub fn length(&self, mesh: &HalfEdgeMesh) -> f64 {
        self.edges()
            .map(|(a, b)| (mesh.position(b) - mesh.position(a)).norm())
            .sum()
    }

    /// Consecutive vertex pairs, closing back to the first vertex.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// Extract every open-boundary loop of `mesh`.
///
/// Returns an empty list for a closed surface.
///
/// # Errors
///
/// [`MeshError::BoundaryTopology`] if a boundary vertex does not have exactly
/// two boundary edges, a walk fails to close, or a loop has fewer than three
/// vertices.
pub fn boundary_loops(mesh: &HalfEdgeMesh) -> Result<Vec<BoundaryLoop>> {
    let edges: Vec<(usize, usize)> = mesh
        .boundary_halfedges()
        .map(|he| (mesh.origin(he).index(), mesh.dest(he).index()))
        .collect();

    if edges.is_empty() {
        debug!("mesh has no boundary edges");
        return Ok(Vec::new());
    }

    debug!("found {} boundary edges", edges.len());

    let loops: Vec<BoundaryLoop> = trace_loops(&edges)?
        .into_iter()
        .map(|walk| BoundaryLoop {
            vertices: walk.into_iter().map(VertexId::new).collect(),
        })
        .collect();

    info!(
        "detected {} boundary loops, sizes: {:?}",
        loops.len(),
        loops.iter().map(BoundaryLoop::len).collect::<Vec<_>>()
    );

    Ok(loops)
}

/// Extract the two boundary loops of a tube.
///
/// Loops are returned in extraction order; labeling them as start and end is
/// up to the caller.
pub fn cylinder_boundary_loops(mesh: &HalfEdgeMesh) -> Result<[BoundaryLoop; 2]> {
    let loops = boundary_loops(mesh)?;
    let count = loops.len();

    loops.try_into().map_err(|_: Vec<BoundaryLoop>| {
        MeshError::boundary(format!("expected 2 boundary loops, found {}", count))
    })
}

/// Chain directed boundary edges into closed vertex walks.
fn trace_loops(edges: &[(usize, usize)]) -> Result<Vec<Vec<usize>>> {
    let mut neighbors: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut successor: HashMap<usize, usize> = HashMap::with_capacity(edges.len());
    for &(a, b) in edges {
        neighbors.entry(a).or_default().push(b);
        neighbors.entry(b).or_default().push(a);
        successor.insert(a, b);
    }

    if let Some((&v, adj)) = neighbors.iter().find(|(_, adj)| adj.len() != 2) {
        return Err(MeshError::boundary(format!(
            "boundary vertex {} has {} boundary edges (expected 2)",
            v,
            adj.len()
        )));
    }

    let mut visited: HashSet<usize> = HashSet::with_capacity(neighbors.len());
    let mut loops = Vec::new();

    for (&start, adj) in &neighbors {
        if visited.contains(&start) {
            continue;
        }

        let mut walk = vec![start];
        visited.insert(start);

        let mut prev = start;
        let mut current = successor.get(&start).copied().unwrap_or(adj[0]);

        while current != start {
            if !visited.insert(current) {
                return Err(MeshError::boundary(format!(
                    "boundary walk from vertex {} does not close",
                    start
                )));
            }
            walk.push(current);

            let [a, b] = [neighbors[&current][0], neighbors[&current][1]];
            let next = if a == prev { b } else { a };
            prev = current;
            current = next;
        }

        if walk.len() < 3 {
            return Err(MeshError::boundary(format!(
                "boundary loop through vertex {} has only {} vertices",
                start,
                walk.len()
            )));
        }

        loops.push(walk);
    }

    Ok(loops)
}
