//! Seam selection for the angular coordinate.
//!
//! The angle around a tube is multivalued; it becomes a proper harmonic
//! field once the tube is cut along a path from one boundary loop to the
//! other. The seam is that path. Vertices on it are pinned to angle 0, and
//! free vertices touching it from the *left* (with respect to the direction
//! start → end and the triangle winding) see it at 2π instead.

use std::collections::{BTreeSet, HashSet};

use log::debug;

use crate::algo::boundary::BoundaryLoop;
use crate::algo::geodesic::{dijkstra_multiple, DijkstraOptions};
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeId, HalfEdgeMesh, VertexId};

/// How the seam of the angular coordinate is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SeamPolicy {
    /// Shortest edge path from the start loop to the end loop.
    #[default]
    ShortestPath,

    /// A caller-supplied vertex path with one endpoint on each loop.
    /// It may be given in either direction.
    Explicit(Vec<usize>),
}

/// A validated seam running from the start loop to the end loop.
#[derive(Debug, Clone)]
pub struct Seam {
    vertices: Vec<VertexId>,
    left: BTreeSet<(VertexId, VertexId)>,
}

impl Seam {
    /// Choose and validate a seam according to `policy`.
    pub fn build(
        mesh: &HalfEdgeMesh,
        start: &BoundaryLoop,
        end: &BoundaryLoop,
        policy: &SeamPolicy,
    ) -> Result<Self> {
        let path = match policy {
            SeamPolicy::ShortestPath => shortest_path(mesh, start, end)?,
            SeamPolicy::Explicit(path) => path.iter().map(|&i| VertexId::new(i)).collect(),
        };

        let vertices = validate_path(mesh, path, start, end)?;
        let left = left_neighbors(mesh, &vertices)?;

        debug!(
            "seam: {} vertices from {:?} to {:?}, {} left-side edges",
            vertices.len(),
            vertices.first(),
            vertices.last(),
            left.len()
        );

        Ok(Self { vertices, left })
    }

    /// Seam vertices from the start loop to the end loop.
    #[inline]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// `(free vertex, seam vertex)` pairs joined by an edge on the left of
    /// the seam.
    pub fn left_edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.left.iter().copied()
    }

    /// Consume the seam, keeping its vertex path.
    pub fn into_vertices(self) -> Vec<VertexId> {
        self.vertices
    }
}

/// Multi-source Dijkstra from every start-loop vertex; the closest end-loop
/// vertex (smallest index on ties) closes the path.
fn shortest_path(
    mesh: &HalfEdgeMesh,
    start: &BoundaryLoop,
    end: &BoundaryLoop,
) -> Result<Vec<VertexId>> {
    let options = DijkstraOptions::default().with_predecessors(true);
    let result = dijkstra_multiple(mesh, start.vertices(), &options);

    let (target, distance) = result
        .closest(end.vertices())
        .ok_or_else(|| MeshError::boundary("no edge path connects the two boundary loops"))?;

    debug!("shortest seam reaches {:?} at length {:.6}", target, distance);

    result
        .path_to(target)
        .ok_or_else(|| MeshError::boundary("no edge path connects the two boundary loops"))
}

/// Check a candidate seam and orient it from `start` to `end`.
fn validate_path(
    mesh: &HalfEdgeMesh,
    mut path: Vec<VertexId>,
    start: &BoundaryLoop,
    end: &BoundaryLoop,
) -> Result<Vec<VertexId>> {
    if path.len() < 2 {
        return Err(MeshError::boundary(format!(
            "seam needs at least 2 vertices, got {}",
            path.len()
        )));
    }

    if let Some(v) = path.iter().find(|v| v.index() >= mesh.num_vertices()) {
        return Err(MeshError::boundary(format!(
            "seam vertex {} is out of range",
            v.index()
        )));
    }

    let mut seen = HashSet::with_capacity(path.len());
    if let Some(v) = path.iter().find(|&&v| !seen.insert(v)) {
        return Err(MeshError::boundary(format!(
            "seam visits vertex {} twice",
            v.index()
        )));
    }

    let (first, last) = (path[0], path[path.len() - 1]);
    if end.contains(first) && start.contains(last) {
        path.reverse();
    } else if !(start.contains(first) && end.contains(last)) {
        return Err(MeshError::boundary(format!(
            "seam must run between the two boundary loops, got {} .. {}",
            first.index(),
            last.index()
        )));
    }

    for pair in path.windows(2) {
        if mesh.find_halfedge(pair[0], pair[1]).is_none() {
            return Err(MeshError::boundary(format!(
                "seam vertices {} and {} are not adjacent",
                pair[0].index(),
                pair[1].index()
            )));
        }
    }

    if let Some(v) = path[1..path.len() - 1]
        .iter()
        .find(|&&v| mesh.is_boundary_vertex(v))
    {
        return Err(MeshError::boundary(format!(
            "interior seam vertex {} lies on the boundary",
            v.index()
        )));
    }

    Ok(path)
}

/// Collect the edges that reach each seam vertex from the left of the seam.
///
/// Around an interior seam vertex the left wedge is swept counter-clockwise
/// from the forward seam edge to the backward one. At the start endpoint the
/// sweep runs counter-clockwise from the forward edge to the boundary; at the
/// end endpoint it runs clockwise from the backward edge to the boundary.
fn left_neighbors(
    mesh: &HalfEdgeMesh,
    seam: &[VertexId],
) -> Result<BTreeSet<(VertexId, VertexId)>> {
    let on_seam: HashSet<VertexId> = seam.iter().copied().collect();
    let cap = mesh.num_halfedges();
    let last = seam.len() - 1;
    let mut left = BTreeSet::new();

    let mut record = |s: VertexId, he: HalfEdgeId| {
        let w = mesh.dest(he);
        if !on_seam.contains(&w) {
            left.insert((w, s));
        }
    };

    for (k, &s) in seam.iter().enumerate() {
        let forward = (k < last).then(|| mesh.find_halfedge(s, seam[k + 1])).flatten();
        let backward = (k > 0).then(|| mesh.find_halfedge(s, seam[k - 1])).flatten();

        let mut steps = 0;
        match (forward, backward) {
            (Some(fwd), Some(back)) => {
                let mut he = mesh.rotate_ccw(fwd);
                while he != back {
                    if mesh.is_boundary_halfedge(he) || steps > cap {
                        return Err(MeshError::boundary(format!(
                            "left side of seam vertex {} reaches the boundary",
                            s.index()
                        )));
                    }
                    record(s, he);
                    he = mesh.rotate_ccw(he);
                    steps += 1;
                }
            }
            (Some(fwd), None) => {
                let mut he = fwd;
                while !mesh.is_boundary_halfedge(he) && steps <= cap {
                    he = mesh.rotate_ccw(he);
                    record(s, he);
                    steps += 1;
                }
            }
            (None, Some(back)) => {
                let mut he = back;
                while !mesh.is_boundary_halfedge(mesh.twin(he)) && steps <= cap {
                    he = mesh.rotate_cw(he);
                    record(s, he);
                    steps += 1;
                }
            }
            (None, None) => {
                return Err(MeshError::boundary(format!(
                    "seam vertex {} has no seam edge",
                    s.index()
                )));
            }
        }
    }

    Ok(left)
}
