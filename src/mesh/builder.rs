//! Mesh construction utilities.
//!
//! This module builds half-edge meshes from face-vertex lists, validating
//! that the input is a manifold triangle surface, and generates the ideal
//! tube used throughout the tests and benchmarks.

use std::collections::HashMap;
use std::f64::consts::TAU;

use nalgebra::Point3;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh};
use super::index::{FaceId, HalfEdgeId, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and triangle faces.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices
///
/// # Errors
/// - [`MeshError::EmptyMesh`] if `faces` is empty
/// - [`MeshError::InvalidVertexIndex`] for an out-of-range index
/// - [`MeshError::DegenerateFace`] for a triangle that repeats a vertex
/// - [`MeshError::NonManifoldEdge`] for an edge used twice in the same
///   direction (shared by more than two faces, or inconsistent winding)
/// - [`MeshError::NonManifold`] for a vertex whose faces do not form a
///   single fan
///
/// # Example
/// ```
/// use tubemap::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());

    let vertex_ids: Vec<VertexId> = vertices
        .iter()
        .map(|&pos| mesh.add_vertex(pos))
        .collect();

    // Directed edge (v0, v1) -> half-edge
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId> = HashMap::with_capacity(faces.len() * 3);

    // First pass: interior half-edges and faces
    for face in faces {
        let base = mesh.num_halfedges();
        let face_id = FaceId::new(mesh.num_faces());
        mesh.faces.push(Face {
            halfedge: HalfEdgeId::new(base),
        });

        for k in 0..3 {
            let he = HalfEdgeId::new(base + k);
            let (v0, v1) = (face[k], face[(k + 1) % 3]);

            mesh.halfedges.push(HalfEdge {
                origin: vertex_ids[v0],
                twin: HalfEdgeId::invalid(),
                next: HalfEdgeId::new(base + (k + 1) % 3),
                prev: HalfEdgeId::new(base + (k + 2) % 3),
                face: face_id,
            });
            mesh.vertex_mut(vertex_ids[v0]).halfedge = he;

            if edge_map.insert((v0, v1), he).is_some() {
                return Err(MeshError::NonManifoldEdge { v0, v1 });
            }
        }
    }

    // Second pass: link twins, walking half-edges in creation order so the
    // boundary half-edge numbering does not depend on hash order.
    let num_interior = mesh.num_halfedges();
    for i in 0..num_interior {
        let he = HalfEdgeId::new(i);
        if mesh.twin(he).is_valid() {
            continue;
        }

        let v0 = mesh.origin(he).index();
        let v1 = mesh.origin(mesh.next(he)).index();

        if let Some(&twin) = edge_map.get(&(v1, v0)) {
            mesh.halfedge_mut(he).twin = twin;
            mesh.halfedge_mut(twin).twin = he;
        } else {
            let boundary_he = HalfEdgeId::new(mesh.num_halfedges());
            mesh.halfedges.push(HalfEdge {
                origin: vertex_ids[v1],
                twin: he,
                ..HalfEdge::default()
            });
            mesh.halfedge_mut(he).twin = boundary_he;
        }
    }

    // Third pass: link boundary half-edges into loops
    link_boundary_loops(&mut mesh)?;

    // Fourth pass: ensure boundary vertices point to boundary half-edges
    fix_boundary_vertex_halfedges(&mut mesh);

    check_vertex_fans(&mesh, faces)?;

    Ok(mesh)
}

/// Link boundary half-edges into proper loops.
///
/// A vertex with two outgoing boundary half-edges is a bow-tie: two face
/// fans touching at a single point.
fn link_boundary_loops(mesh: &mut HalfEdgeMesh) -> Result<()> {
    let boundary_hes: Vec<HalfEdgeId> = mesh.boundary_halfedges().collect();

    let mut outgoing: HashMap<usize, HalfEdgeId> = HashMap::with_capacity(boundary_hes.len());
    for &he in &boundary_hes {
        let origin = mesh.origin(he).index();
        if outgoing.insert(origin, he).is_some() {
            return Err(MeshError::NonManifold {
                details: format!("vertex {} has more than one boundary fan", origin),
            });
        }
    }

    for &he in &boundary_hes {
        let dest = mesh.dest(he).index();
        match outgoing.get(&dest) {
            Some(&next_he) => {
                mesh.halfedge_mut(he).next = next_he;
                mesh.halfedge_mut(next_he).prev = he;
            }
            None => {
                return Err(MeshError::NonManifold {
                    details: format!("boundary does not continue through vertex {}", dest),
                });
            }
        }
    }

    Ok(())
}

/// Ensure boundary vertices point to a boundary half-edge.
fn fix_boundary_vertex_halfedges(mesh: &mut HalfEdgeMesh) {
    for he in mesh.boundary_halfedges().collect::<Vec<_>>() {
        let origin = mesh.origin(he);
        mesh.vertex_mut(origin).halfedge = he;
    }
}

/// Every face touching a vertex must be reachable by rotating around it.
/// Closed fans glued at a vertex pass the edge checks but fail this one.
fn check_vertex_fans(mesh: &HalfEdgeMesh, faces: &[[usize; 3]]) -> Result<()> {
    let mut incident = vec![0usize; mesh.num_vertices()];
    for face in faces {
        for &v in face {
            incident[v] += 1;
        }
    }

    for v in mesh.vertex_ids() {
        let reached = mesh.vertex_faces(v).count();
        if reached != incident[v.index()] {
            return Err(MeshError::NonManifold {
                details: format!(
                    "vertex {} has {} incident faces but its fan reaches {}",
                    v.index(),
                    incident[v.index()],
                    reached
                ),
            });
        }
    }

    Ok(())
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Returns (vertices, faces) tuple.
pub fn to_face_vertex(mesh: &HalfEdgeMesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let vertices: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();

    let faces: Vec<[usize; 3]> = mesh
        .face_ids()
        .map(|f| {
            let [v0, v1, v2] = mesh.face_triangle(f);
            [v0.index(), v1.index(), v2.index()]
        })
        .collect();

    (vertices, faces)
}

/// Vertex positions and triangles of a regular open tube.
///
/// Vertex `k * segments + j` sits on ring `k` at angle `2πj / segments`:
/// `(r cos, r sin, k * length / (rings - 1))`. Triangles face outward, and
/// rings `0` and `rings - 1` are the two open boundaries.
pub fn tube_geometry(
    rings: usize,
    segments: usize,
    radius: f64,
    length: f64,
) -> Result<(Vec<Point3<f64>>, Vec<[usize; 3]>)> {
    if rings < 2 {
        return Err(MeshError::invalid_param("rings", rings, "must be at least 2"));
    }
    if segments < 3 {
        return Err(MeshError::invalid_param("segments", segments, "must be at least 3"));
    }
    if !(radius.is_finite() && radius > 0.0) {
        return Err(MeshError::invalid_param("radius", radius, "must be positive"));
    }
    if !(length.is_finite() && length > 0.0) {
        return Err(MeshError::invalid_param("length", length, "must be positive"));
    }

    let dz = length / (rings - 1) as f64;
    let mut vertices = Vec::with_capacity(rings * segments);
    for k in 0..rings {
        for j in 0..segments {
            let angle = TAU * j as f64 / segments as f64;
            vertices.push(Point3::new(
                radius * angle.cos(),
                radius * angle.sin(),
                k as f64 * dz,
            ));
        }
    }

    let idx = |k: usize, j: usize| k * segments + j % segments;
    let mut faces = Vec::with_capacity(2 * (rings - 1) * segments);
    for k in 0..rings - 1 {
        for j in 0..segments {
            faces.push([idx(k, j), idx(k, j + 1), idx(k + 1, j + 1)]);
            faces.push([idx(k, j), idx(k + 1, j + 1), idx(k + 1, j)]);
        }
    }

    Ok((vertices, faces))
}

/// Build a regular open tube along the z axis.
///
/// See [`tube_geometry`] for the vertex layout.
///
/// # Example
/// ```
/// use tubemap::mesh::build_tube;
///
/// let tube = build_tube(10, 16, 1.0, 9.0).unwrap();
/// assert_eq!(tube.num_vertices(), 160);
/// assert_eq!(tube.euler_characteristic(), 0);
/// ```
pub fn build_tube(
    rings: usize,
    segments: usize,
    radius: f64,
    length: f64,
) -> Result<HalfEdgeMesh> {
    let (vertices, faces) = tube_geometry(rings, segments, radius, length)?;
    build_from_triangles(&vertices, &faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2]];
        (vertices, faces)
    }

    fn two_triangles() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        // Two triangles sharing an edge
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3]];
        (vertices, faces)
    }

    #[test]
    fn test_single_triangle() {
        let (vertices, faces) = single_triangle();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 1);
        // 3 interior half-edges + 3 boundary half-edges
        assert_eq!(mesh.num_halfedges(), 6);
        assert!(mesh.is_valid());

        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_two_triangles() {
        let (vertices, faces) = two_triangles();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        // 6 interior half-edges + 4 boundary half-edges
        assert_eq!(mesh.num_halfedges(), 10);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_roundtrip() {
        let (vertices, faces) = two_triangles();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        let (out_verts, out_faces) = to_face_vertex(&mesh);

        assert_eq!(out_faces, faces);
        for (v_in, v_out) in vertices.iter().zip(out_verts.iter()) {
            assert!((v_in - v_out).norm() < 1e-10);
        }
    }

    #[test]
    fn test_empty_faces() {
        let vertices = vec![Point3::origin()];
        let result = build_from_triangles(&vertices, &[]);
        assert!(matches!(result, Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_invalid_vertex_index() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let faces = vec![[0, 1, 2]];

        let result = build_from_triangles(&vertices, &faces);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { face: 0, vertex: 1 })
        ));
    }

    #[test]
    fn test_degenerate_face() {
        let (vertices, _) = single_triangle();
        let faces = vec![[0, 0, 2]];

        let result = build_from_triangles(&vertices, &faces);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));
    }

    #[test]
    fn test_edge_shared_by_three_faces() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3], [0, 1, 4]];

        let result = build_from_triangles(&vertices, &faces);
        assert!(matches!(result, Err(MeshError::NonManifoldEdge { .. })));
    }

    #[test]
    fn test_inconsistent_winding() {
        let (vertices, _) = two_triangles();
        let faces = vec![[0, 1, 2], [0, 1, 3]];

        let result = build_from_triangles(&vertices, &faces);
        assert!(matches!(
            result,
            Err(MeshError::NonManifoldEdge { v0: 0, v1: 1 })
        ));
    }

    #[test]
    fn test_bowtie_vertex() {
        // Two triangles touching only at vertex 0
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(-1.0, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [0, 3, 4]];

        let result = build_from_triangles(&vertices, &faces);
        assert!(matches!(result, Err(MeshError::NonManifold { .. })));
    }

    #[test]
    fn test_closed_fans_sharing_vertex() {
        // Two closed tetrahedra glued at vertex 0: every edge has two faces,
        // but vertex 0 carries two separate fans.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        let faces = vec![
            [0, 2, 1],
            [0, 1, 3],
            [0, 3, 2],
            [1, 2, 3],
            [0, 5, 4],
            [0, 4, 6],
            [0, 6, 5],
            [4, 5, 6],
        ];

        let result = build_from_triangles(&vertices, &faces);
        assert!(matches!(result, Err(MeshError::NonManifold { .. })));
    }

    #[test]
    fn test_deterministic_construction() {
        let (vertices, faces) = tube_geometry(4, 6, 1.0, 3.0).unwrap();
        let a = build_from_triangles(&vertices, &faces).unwrap();
        let b = build_from_triangles(&vertices, &faces).unwrap();

        for he in a.halfedge_ids() {
            assert_eq!(a.twin(he), b.twin(he));
            assert_eq!(a.next(he), b.next(he));
            assert_eq!(a.origin(he), b.origin(he));
        }
    }

    #[test]
    fn test_tube_layout() {
        let mesh = build_tube(10, 16, 1.0, 9.0).unwrap();

        assert_eq!(mesh.num_vertices(), 160);
        assert_eq!(mesh.num_faces(), 2 * 9 * 16);
        assert!(mesh.is_valid());
        assert_eq!(mesh.euler_characteristic(), 0);
        assert_eq!(mesh.boundary_halfedges().count(), 32);

        let p = mesh.position(VertexId::new(3 * 16 + 4));
        assert!((p.z - 3.0).abs() < 1e-12);
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);

        for v in mesh.vertex_ids() {
            let ring = v.index() / 16;
            assert_eq!(mesh.is_boundary_vertex(v), ring == 0 || ring == 9);
        }
    }

    #[test]
    fn test_tube_faces_point_outward() {
        let mesh = build_tube(3, 8, 2.0, 1.0).unwrap();
        for f in mesh.face_ids() {
            let [p0, p1, p2] = mesh.face_positions(f);
            let centroid = (p0.coords + p1.coords + p2.coords) / 3.0;
            let radial = nalgebra::Vector3::new(centroid.x, centroid.y, 0.0);
            assert!(mesh.face_normal(f).dot(&radial) > 0.0);
        }
    }

    #[test]
    fn test_tube_parameters() {
        assert!(matches!(
            build_tube(1, 16, 1.0, 1.0),
            Err(MeshError::InvalidParameter { name: "rings", .. })
        ));
        assert!(matches!(
            build_tube(4, 2, 1.0, 1.0),
            Err(MeshError::InvalidParameter { name: "segments", .. })
        ));
        assert!(matches!(
            build_tube(4, 8, -1.0, 1.0),
            Err(MeshError::InvalidParameter { name: "radius", .. })
        ));
        assert!(matches!(
            build_tube(4, 8, 1.0, f64::NAN),
            Err(MeshError::InvalidParameter { name: "length", .. })
        ));
    }
}
