//! Harmonic disk parameterization.
//!
//! Pins the single boundary loop of a disk-like mesh to the unit circle,
//! spaced by arc length, and solves one harmonic field per UV axis. With
//! non-negative weights this is a Tutte embedding and has no flipped
//! triangles.

use std::f64::consts::TAU;

use log::info;
use nalgebra::Point2;

use super::uv::UVMap;
use crate::algo::boundary::boundary_loops;
use crate::algo::harmonic::{solve, BoundaryConditions, HarmonicOptions};
use crate::algo::laplacian::Laplacian;
use crate::error::{MeshError, Result};
use crate::mesh::HalfEdgeMesh;

/// Map a disk-like mesh into `[0, 1]²`.
///
/// The boundary lands on the circle of radius 0.5 centered at `(0.5, 0.5)`.
/// Boundary vertices are placed clockwise in walk order, which keeps the
/// triangles' UV orientation the same as their 3D winding.
///
/// # Errors
///
/// - [`MeshError::EmptyMesh`] / [`MeshError::Disconnected`] for unusable input
/// - [`MeshError::BoundaryTopology`] unless the mesh has exactly one
///   boundary loop and Euler characteristic 1
/// - solver errors from the two harmonic solves
///
/// # Example
///
/// ```
/// use tubemap::algo::harmonic::HarmonicOptions;
/// use tubemap::algo::parameterize::disk_map;
/// use tubemap::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.5, 0.5, 0.0),
/// ];
/// let faces = vec![[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]];
/// let mesh = build_from_triangles(&vertices, &faces).unwrap();
///
/// let uv = disk_map(&mesh, &HarmonicOptions::default()).unwrap();
/// let center = uv.get(tubemap::mesh::VertexId::new(4));
/// assert!((center.x - 0.5).abs() < 1e-8 && (center.y - 0.5).abs() < 1e-8);
/// ```
pub fn disk_map(mesh: &HalfEdgeMesh, options: &HarmonicOptions) -> Result<UVMap> {
    options.solver.validate()?;

    if mesh.num_faces() == 0 {
        return Err(MeshError::EmptyMesh);
    }

    let (components, _) = mesh.connected_components();
    if components > 1 {
        return Err(MeshError::Disconnected { components });
    }

    let mut loops = boundary_loops(mesh)?;
    if loops.len() != 1 {
        return Err(MeshError::boundary(format!(
            "expected 1 boundary loop, found {}",
            loops.len()
        )));
    }
    let chi = mesh.euler_characteristic();
    if chi != 1 {
        return Err(MeshError::boundary(format!(
            "surface with one boundary loop has Euler characteristic {} (expected 1)",
            chi
        )));
    }
    let boundary = loops.remove(0);

    info!(
        "disk map: {} vertices, boundary of {} vertices",
        mesh.num_vertices(),
        boundary.len()
    );

    let perimeter = boundary.length(mesh);
    if perimeter.is_nan() || perimeter <= 0.0 {
        return Err(MeshError::boundary("boundary loop has zero length"));
    }

    let mut u_conditions = BoundaryConditions::new();
    let mut v_conditions = BoundaryConditions::new();
    let mut travelled = 0.0;
    for (a, b) in boundary.edges() {
        let angle = -TAU * travelled / perimeter;
        u_conditions.fix(a, angle.cos());
        v_conditions.fix(a, angle.sin());
        travelled += (mesh.position(b) - mesh.position(a)).norm();
    }

    let laplacian = Laplacian::build(mesh, options.weight_mode)?;
    let solver = &options.solver;
    let (u, v) = if solver.parallel {
        rayon::join(
            || solve(&laplacian, &u_conditions, solver),
            || solve(&laplacian, &v_conditions, solver),
        )
    } else {
        (
            solve(&laplacian, &u_conditions, solver),
            solve(&laplacian, &v_conditions, solver),
        )
    };
    let (u, v) = (u?, v?);

    Ok(UVMap::new(
        u.values()
            .iter()
            .zip(v.values())
            .map(|(&x, &y)| Point2::new(0.5 * (x + 1.0), 0.5 * (y + 1.0)))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::laplacian::WeightMode;
    use crate::mesh::{build_from_triangles, build_tube, to_face_vertex, VertexId};
    use nalgebra::Point3;

    fn grid(n: usize) -> HalfEdgeMesh {
        let mut vertices = Vec::new();
        for y in 0..=n {
            for x in 0..=n {
                vertices.push(Point3::new(x as f64, y as f64, 0.1 * (x * y) as f64));
            }
        }
        let mut faces = Vec::new();
        for y in 0..n {
            for x in 0..n {
                let v00 = y * (n + 1) + x;
                let v10 = v00 + 1;
                let v01 = v00 + n + 1;
                let v11 = v01 + 1;
                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_boundary_on_circle() {
        let mesh = grid(4);
        let uv = disk_map(&mesh, &HarmonicOptions::default()).unwrap();

        assert_eq!(uv.len(), mesh.num_vertices());
        for v in mesh.vertex_ids() {
            let p = uv.get(v);
            let r = ((p.x - 0.5).powi(2) + (p.y - 0.5).powi(2)).sqrt();
            if mesh.is_boundary_vertex(v) {
                assert!((r - 0.5).abs() < 1e-12, "{:?} at radius {}", v, r);
            } else {
                assert!(r < 0.5);
            }
        }
    }

    #[test]
    fn test_no_flipped_triangles() {
        let mesh = grid(5);
        let (_, faces) = to_face_vertex(&mesh);

        for mode in [WeightMode::Uniform, WeightMode::Cotangent] {
            let uv = disk_map(&mesh, &HarmonicOptions::default().with_weight_mode(mode)).unwrap();
            for face in &faces {
                assert!(uv.signed_area(face) > 0.0, "{:?} flipped under {:?}", face, mode);
            }
            assert!(uv.total_area(&faces) < std::f64::consts::PI * 0.25 + 1e-9);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mesh = grid(4);
        let a = disk_map(&mesh, &HarmonicOptions::default()).unwrap();
        let b = disk_map(&mesh, &HarmonicOptions::default().with_parallel(false)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_triangle() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
        let uv = disk_map(&mesh, &HarmonicOptions::default()).unwrap();

        assert_eq!(uv.get(VertexId::new(0)), Point2::new(1.0, 0.5));
        assert!(uv.signed_area(&[0, 1, 2]) > 0.0);
    }

    #[test]
    fn test_rejects_tube() {
        let tube = build_tube(3, 8, 1.0, 2.0).unwrap();
        let err = disk_map(&tube, &HarmonicOptions::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid boundary topology: expected 1 boundary loop, found 2"
        );
    }

    #[test]
    fn test_rejects_closed_surface() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert!(matches!(
            disk_map(&mesh, &HarmonicOptions::default()),
            Err(MeshError::BoundaryTopology { .. })
        ));
    }
}
