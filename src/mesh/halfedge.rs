//! Half-edge mesh data structure.
//!
//! Triangle meshes are stored as a half-edge (doubly-connected edge list)
//! structure. This gives O(1) access to the one-ring of a vertex, to the
//! faces on either side of an edge, and to the boundary, which is what the
//! Laplacian builder, the boundary extractor and the seam cutter all walk.
//!
//! # Structure
//!
//! - Each edge is split into two **half-edges** pointing in opposite directions
//! - Each half-edge knows its **twin**, its **next**/**prev** half-edge around
//!   the face, its **origin** vertex and its **face**
//! - Each vertex stores one outgoing half-edge
//! - Each face stores one of its half-edges
//!
//! # Boundary Handling
//!
//! Boundary half-edges have an invalid face. Their `next`/`prev` pointers link
//! them into closed boundary loops, and every boundary vertex points at its
//! outgoing boundary half-edge.
//!
//! # Orientation
//!
//! Faces are counter-clockwise when seen from the side their normal points
//! to, so a face lies to the *left* of each of its half-edges.
//! [`HalfEdgeMesh::rotate_ccw`] and [`HalfEdgeMesh::rotate_cw`] step between
//! the outgoing half-edges of a vertex in that frame.

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, HalfEdgeId, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex.
    /// For boundary vertices, this is guaranteed to be a boundary half-edge.
    pub halfedge: HalfEdgeId,
}

impl Vertex {
    /// Create a new vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfEdge {
    /// The vertex this half-edge originates from.
    pub origin: VertexId,

    /// The opposite half-edge.
    pub twin: HalfEdgeId,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId,

    /// The face this half-edge belongs to. Invalid on the boundary.
    pub face: FaceId,
}

impl HalfEdge {
    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy, Default)]
pub struct Face {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId,
}

/// A half-edge mesh for triangle surfaces.
///
/// Meshes are built with [`build_from_triangles`](super::build_from_triangles)
/// (or [`build_tube`](super::build_tube)), which validates the input, and are
/// read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) halfedges: Vec<HalfEdge>,
    pub(crate) faces: Vec<Face>,
}

impl HalfEdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub(crate) fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // Interior half-edges are 3F; boundary ones add at most F/2 in practice.
        let num_halfedges = num_faces * 3 + num_faces / 2;

        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
        }
    }

    // ==================== Accessors ====================

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of half-edges, boundary half-edges included.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Number of undirected edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.halfedges.len() / 2
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    #[inline]
    pub(crate) fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id.index()]
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, id: HalfEdgeId) -> &mut HalfEdge {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId) -> VertexId {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId) -> VertexId {
        self.origin(self.twin(he))
    }

    /// Get the face of a half-edge (invalid on the boundary).
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        self.halfedge(he).face
    }

    /// Next outgoing half-edge of the same origin, counter-clockwise.
    ///
    /// The face of `he` lies between `he` and the returned half-edge.
    #[inline]
    pub fn rotate_ccw(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.twin(self.prev(he))
    }

    /// Next outgoing half-edge of the same origin, clockwise.
    #[inline]
    pub fn rotate_cw(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.next(self.twin(he))
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the boundary.
    ///
    /// Boundary vertices always point at their outgoing boundary half-edge,
    /// so this is O(1).
    #[inline]
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        let he = self.vertex(v).halfedge;
        !he.is_valid() || self.is_boundary_halfedge(he)
    }

    /// Check if an edge (represented by one of its half-edges) is on the boundary.
    #[inline]
    pub fn is_boundary_edge(&self, he: HalfEdgeId) -> bool {
        self.is_boundary_halfedge(he) || self.is_boundary_halfedge(self.twin(he))
    }

    /// Find the half-edge going from `a` to `b`, if the two vertices share an edge.
    pub fn find_halfedge(&self, a: VertexId, b: VertexId) -> Option<HalfEdgeId> {
        self.vertex_halfedges(a).find(|&he| self.dest(he) == b)
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over undirected edges, yielding the half-edge whose origin has
    /// the smaller index.
    pub fn edges(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.halfedge_ids()
            .filter(move |&he| self.origin(he) < self.dest(he))
    }

    /// Iterate over all boundary half-edges.
    pub fn boundary_halfedges(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.halfedge_ids()
            .filter(move |&he| self.is_boundary_halfedge(he))
    }

    /// Iterate over outgoing half-edges around a vertex (clockwise).
    pub fn vertex_halfedges(&self, v: VertexId) -> VertexHalfEdgeIter<'_> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over vertices adjacent to a vertex.
    pub fn vertex_neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_halfedges(v).map(|he| self.dest(he))
    }

    /// Iterate over faces adjacent to a vertex.
    pub fn vertex_faces(&self, v: VertexId) -> impl Iterator<Item = FaceId> + '_ {
        self.vertex_halfedges(v)
            .map(|he| self.face_of(he))
            .filter(|f| f.is_valid())
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId) -> FaceHalfEdgeIter<'_> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Get the three vertices of a triangular face.
    pub fn face_triangle(&self, f: FaceId) -> [VertexId; 3] {
        let he0 = self.face(f).halfedge;
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [self.origin(he0), self.origin(he1), self.origin(he2)]
    }

    /// Get the positions of the three vertices of a triangular face.
    pub fn face_positions(&self, f: FaceId) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    // ==================== Geometry ====================

    /// Compute the unit normal of a face.
    pub fn face_normal(&self, f: FaceId) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        (p1 - p0).cross(&(p2 - p0)).normalize()
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Compute the length of an edge.
    pub fn edge_length(&self, he: HalfEdgeId) -> f64 {
        (self.position(self.dest(he)) - self.position(self.origin(he))).norm()
    }

    /// Cotangent of the angle opposite `he` inside its face.
    ///
    /// Returns 0 for boundary half-edges and for faces whose corner is too
    /// thin to have a meaningful angle.
    pub fn corner_cotangent(&self, he: HalfEdgeId) -> f64 {
        if self.is_boundary_halfedge(he) {
            return 0.0;
        }

        let a = self.position(self.origin(he));
        let b = self.position(self.dest(he));
        let c = self.position(self.origin(self.prev(he)));

        let ca = a - c;
        let cb = b - c;
        let cross_len = ca.cross(&cb).norm();

        if cross_len < 1e-12 {
            0.0
        } else {
            ca.dot(&cb) / cross_len
        }
    }

    /// Euler characteristic `V - E + F`.
    pub fn euler_characteristic(&self) -> i64 {
        self.num_vertices() as i64 - self.num_edges() as i64 + self.num_faces() as i64
    }

    /// Label the connected components of the vertex graph.
    ///
    /// Returns the number of components and a component label per vertex.
    /// Vertices not referenced by any face form singleton components.
    pub fn connected_components(&self) -> (usize, Vec<usize>) {
        let n = self.num_vertices();
        let mut labels = vec![usize::MAX; n];
        let mut count = 0;
        let mut stack = Vec::new();

        for seed in self.vertex_ids() {
            if labels[seed.index()] != usize::MAX {
                continue;
            }

            labels[seed.index()] = count;
            stack.push(seed);
            while let Some(v) = stack.pop() {
                for w in self.vertex_neighbors(v) {
                    if labels[w.index()] == usize::MAX {
                        labels[w.index()] = count;
                        stack.push(w);
                    }
                }
            }
            count += 1;
        }

        (count, labels)
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let (mut min, mut max) = (first, first);

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    // ==================== Construction ====================

    pub(crate) fn add_vertex(&mut self, position: Point3<f64>) -> VertexId {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    // ==================== Validation ====================

    /// Check that all connectivity pointers are mutually consistent.
    pub fn is_valid(&self) -> bool {
        for (i, v) in self.vertices.iter().enumerate() {
            if v.halfedge.is_valid() && self.halfedge(v.halfedge).origin.index() != i {
                return false;
            }
        }

        for (i, he) in self.halfedges.iter().enumerate() {
            if !he.twin.is_valid() || self.halfedge(he.twin).twin.index() != i {
                return false;
            }
            if he.next.is_valid() && self.halfedge(he.next).prev.index() != i {
                return false;
            }
            if he.prev.is_valid() && self.halfedge(he.prev).next.index() != i {
                return false;
            }
        }

        self.faces.iter().all(|f| f.halfedge.is_valid())
    }
}

/// Iterator over outgoing half-edges around a vertex.
pub struct VertexHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    done: bool,
}

impl<'a> VertexHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, v: VertexId) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl Iterator for VertexHalfEdgeIter<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.rotate_cw(self.current);
        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    done: bool,
}

impl<'a> FaceHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, f: FaceId) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl Iterator for FaceHalfEdgeIter<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);
        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;

    fn right_triangle_pair() -> HalfEdgeMesh {
        // Unit square split along the 0-2 diagonal.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap()
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
        assert!(mesh.bounding_box().is_none());
    }

    #[test]
    fn test_edge_counts() {
        let mesh = right_triangle_pair();
        assert_eq!(mesh.num_edges(), 5);
        assert_eq!(mesh.edges().count(), 5);
        assert_eq!(mesh.boundary_halfedges().count(), 4);
        assert_eq!(mesh.euler_characteristic(), 1);
    }

    #[test]
    fn test_face_geometry() {
        let mesh = right_triangle_pair();
        let f = FaceId::new(1);

        assert_eq!(mesh.face_triangle(f), [0, 2, 3].map(VertexId::new));
        assert_eq!(mesh.face_halfedges(f).count(), 3);
        assert!((mesh.face_area(f) - 0.5).abs() < 1e-12);
        assert!((mesh.face_normal(f).z - 1.0).abs() < 1e-12);

        let total: f64 = mesh.face_ids().map(|f| mesh.face_area(f)).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_find_halfedge() {
        let mesh = right_triangle_pair();
        let he = mesh.find_halfedge(VertexId::new(0), VertexId::new(2)).unwrap();
        assert_eq!(mesh.origin(he), VertexId::new(0));
        assert_eq!(mesh.dest(he), VertexId::new(2));
        assert!(mesh.find_halfedge(VertexId::new(1), VertexId::new(3)).is_none());
    }

    #[test]
    fn test_corner_cotangent() {
        let mesh = right_triangle_pair();

        // Diagonal 0-2 is opposite a right angle on both sides.
        let diag = mesh.find_halfedge(VertexId::new(0), VertexId::new(2)).unwrap();
        assert!(mesh.corner_cotangent(diag).abs() < 1e-12);
        assert!(mesh.corner_cotangent(mesh.twin(diag)).abs() < 1e-12);

        // Edge 0-1 is opposite the 45 degree corner at vertex 2.
        let bottom = mesh.find_halfedge(VertexId::new(0), VertexId::new(1)).unwrap();
        assert!((mesh.corner_cotangent(bottom) - 1.0).abs() < 1e-12);
        assert_eq!(mesh.corner_cotangent(mesh.twin(bottom)), 0.0);
    }

    #[test]
    fn test_rotation_is_inverse() {
        let mesh = right_triangle_pair();
        for he in mesh.halfedge_ids() {
            assert_eq!(mesh.rotate_cw(mesh.rotate_ccw(he)), he);
            assert_eq!(mesh.origin(mesh.rotate_ccw(he)), mesh.origin(he));
        }
    }

    #[test]
    fn test_rotate_ccw_sweeps_face() {
        let mesh = right_triangle_pair();
        // Around vertex 0, going counter-clockwise from 0->1 passes face 0.
        let he = mesh.find_halfedge(VertexId::new(0), VertexId::new(1)).unwrap();
        assert_eq!(mesh.face_of(he), FaceId::new(0));
        let next = mesh.rotate_ccw(he);
        assert_eq!(mesh.dest(next), VertexId::new(2));
    }

    #[test]
    fn test_connected_components() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(6.0, 0.0, 0.0),
            Point3::new(5.0, 1.0, 0.0),
        ];
        let mesh = build_from_triangles(&vertices, &[[0, 1, 2], [3, 4, 5]]).unwrap();
        let (count, labels) = mesh.connected_components();
        assert_eq!(count, 2);
        assert_eq!(labels[0], labels[2]);
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn test_boundary_vertices() {
        let mesh = right_triangle_pair();
        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v));
        }
    }
}
