//! # Tubemap
//!
//! Harmonic parameterization of tubular triangle meshes.
//!
//! Tubemap maps a tube (a connected genus-0 surface with exactly two open
//! boundary loops) onto the lateral surface of a unit cylinder. Each vertex
//! gets an axial coordinate `z ∈ [0, 1]` and an angle `θ ∈ [0, 2π)`, both
//! harmonic with respect to a discrete Laplace-Beltrami operator.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe indices
//! - **Boundary extraction**: ordered boundary loops with topology checks
//! - **Discrete Laplacians**: cotangent or uniform weights in CSR form
//! - **Harmonic solves**: Dirichlet conditions with ridge offsets, solved by
//!   preconditioned conjugate gradient and checked against the maximum principle
//! - **Maps**: cylinder coordinates for tubes, UV coordinates for disks
//!
//! ## Quick Start
//!
//! ```
//! use tubemap::prelude::*;
//!
//! let tube = build_tube(10, 16, 1.0, 9.0).unwrap();
//! let map = cylinder_map(&tube, &CylinderMapOptions::default()).unwrap();
//!
//! for v in tube.vertex_ids().take(3) {
//!     let c = map.coordinate(v);
//!     println!("{:?}: theta={:.3}, z={:.3}", v, c.theta, c.z);
//! }
//! assert_eq!(map.zs()[0], 0.0);
//! assert_eq!(map.zs()[159], 1.0);
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use tubemap::prelude::*;
//! use nalgebra::Point3;
//!
//! // An open-ended triangular prism: the smallest tube.
//! let vertices = vec![
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(-0.5, 0.866, 0.0),
//!     Point3::new(-0.5, -0.866, 0.0),
//!     Point3::new(1.0, 0.0, 1.0),
//!     Point3::new(-0.5, 0.866, 1.0),
//!     Point3::new(-0.5, -0.866, 1.0),
//! ];
//! let faces = vec![
//!     [0, 1, 4], [0, 4, 3],
//!     [1, 2, 5], [1, 5, 4],
//!     [2, 0, 3], [2, 3, 5],
//! ];
//!
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 6);
//! assert_eq!(mesh.euler_characteristic(), 0);
//!
//! let [a, b] = tubemap::algo::boundary::cylinder_boundary_loops(&mesh).unwrap();
//! assert_eq!((a.len(), b.len()), (3, 3));
//! ```
//!
//! ## Generic Harmonic Fields
//!
//! ```
//! use tubemap::prelude::*;
//! use tubemap::algo::harmonic::{harmonic_field, BoundaryConditions, HarmonicOptions};
//!
//! let tube = build_tube(5, 8, 1.0, 4.0).unwrap();
//!
//! let mut conditions = BoundaryConditions::new();
//! conditions
//!     .fix_all((0..8).map(VertexId::new), -1.0)
//!     .fix_all((32..40).map(VertexId::new), 1.0);
//!
//! let field = harmonic_field(&tube, &conditions, &HarmonicOptions::default()).unwrap();
//! assert!(field.get(VertexId::new(16)).abs() < 1e-6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use tubemap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::laplacian::WeightMode;
    pub use crate::algo::parameterize::{
        cylinder_map, disk_map, CylinderCoordinate, CylinderMap, CylinderMapOptions, LoopOrder,
        SeamPolicy, UVMap,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_triangles, build_tube, to_face_vertex, Face, FaceId, HalfEdge, HalfEdgeId,
        HalfEdgeMesh, Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::f64::consts::TAU;

    #[test]
    fn test_tube_end_to_end() {
        let tube = build_tube(10, 16, 1.0, 9.0).unwrap();

        assert_eq!(tube.num_vertices(), 160);
        assert_eq!(tube.num_faces(), 2 * 9 * 16);
        assert_eq!(tube.euler_characteristic(), 0);
        assert!(tube.is_valid());

        let map = cylinder_map(&tube, &CylinderMapOptions::default()).unwrap();
        for k in 0..10 {
            for j in 0..16 {
                let c = map.coordinate(VertexId::new(k * 16 + j));
                assert!((c.z - k as f64 / 9.0).abs() < 1e-6);

                let d = (c.theta - TAU * j as f64 / 16.0).rem_euclid(TAU);
                assert!(d.min(TAU - d) < 1e-6);
            }
        }
    }
}
