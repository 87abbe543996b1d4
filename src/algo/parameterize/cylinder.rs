//! Harmonic cylinder parameterization.
//!
//! Maps a tube (a connected genus-0 surface with exactly two boundary loops)
//! onto the lateral surface of the unit cylinder. Each vertex receives a
//! longitudinal coordinate `z ∈ [0, 1]` and an angle `θ ∈ [0, 2π)`:
//!
//! - `z` is the harmonic field that is 0 on the start loop and 1 on the end loop.
//! - `θ` is the harmonic field that jumps by 2π across a seam running from
//!   the start loop to the end loop, reduced into `[0, 2π)`.
//!
//! Both fields are solved against a single Laplacian. With outward-facing
//! triangles, θ increases right-handedly about the axis pointing from the
//! start loop to the end loop.
//!
//! # Example
//!
//! ```
//! use tubemap::algo::parameterize::{cylinder_map, CylinderMapOptions};
//! use tubemap::mesh::{build_tube, VertexId};
//!
//! let tube = build_tube(10, 16, 1.0, 9.0).unwrap();
//! let map = cylinder_map(&tube, &CylinderMapOptions::default()).unwrap();
//!
//! let c = map.coordinate(VertexId::new(3 * 16 + 4));
//! assert!((c.z - 3.0 / 9.0).abs() < 1e-6);
//! assert!((c.theta - std::f64::consts::FRAC_PI_2).abs() < 1e-6);
//! ```

use std::f64::consts::TAU;

use log::{info, warn};
use nalgebra::{Matrix3, Point2, Point3, SymmetricEigen, Vector3};

use super::seam::{Seam, SeamPolicy};
use super::uv::UVMap;
use crate::algo::boundary::{cylinder_boundary_loops, BoundaryLoop};
use crate::algo::harmonic::{solve, BoundaryConditions, ScalarField, SolverOptions};
use crate::algo::laplacian::{Laplacian, WeightMode};
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, VertexId};

/// Which boundary loop becomes the start (`z = 0`) loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoopOrder {
    /// The loop whose centroid projects lower on the principal axis of the
    /// vertex cloud. Ties keep extraction order.
    #[default]
    PrincipalAxis,

    /// The loop containing the given vertex.
    StartContains(usize),
}

/// Options for [`cylinder_map`].
#[derive(Debug, Clone)]
pub struct CylinderMapOptions {
    /// Laplacian edge weights (default: cotangent).
    pub weight_mode: WeightMode,

    /// Seam selection for the angular field (default: shortest path).
    pub seam_policy: SeamPolicy,

    /// Start/end loop labeling (default: principal axis).
    pub loop_order: LoopOrder,

    /// Radius of the target cylinder for Cartesian output (default: 1.0).
    pub radius: f64,

    /// Whether to compute Cartesian cylinder points (default: true).
    pub cartesian: bool,

    /// Linear solve settings.
    pub solver: SolverOptions,

    /// Whether to solve the two fields concurrently (default: true).
    pub parallel: bool,
}

impl Default for CylinderMapOptions {
    fn default() -> Self {
        Self {
            weight_mode: WeightMode::default(),
            seam_policy: SeamPolicy::default(),
            loop_order: LoopOrder::default(),
            radius: 1.0,
            cartesian: true,
            solver: SolverOptions::default(),
            parallel: true,
        }
    }
}

impl CylinderMapOptions {
    /// Set the Laplacian weighting.
    pub fn with_weight_mode(mut self, weight_mode: WeightMode) -> Self {
        self.weight_mode = weight_mode;
        self
    }

    /// Set the seam policy.
    pub fn with_seam(mut self, seam_policy: SeamPolicy) -> Self {
        self.seam_policy = seam_policy;
        self
    }

    /// Set the start/end loop labeling.
    pub fn with_loop_order(mut self, loop_order: LoopOrder) -> Self {
        self.loop_order = loop_order;
        self
    }

    /// Set the cylinder radius used for Cartesian output.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Set whether Cartesian points are computed.
    pub fn with_cartesian(mut self, cartesian: bool) -> Self {
        self.cartesian = cartesian;
        self
    }

    /// Replace the solver settings.
    pub fn with_solver(mut self, solver: SolverOptions) -> Self {
        self.solver = solver;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.solver.tolerance = tolerance;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.solver.max_iterations = max_iterations;
        self
    }

    /// Set whether to use parallel execution, for both the field solves and
    /// the matrix products inside them.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self.solver.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(self) -> Self {
        self.with_parallel(false)
    }

    fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(MeshError::invalid_param("radius", self.radius, "must be positive"));
        }
        self.solver.validate()
    }
}

/// Cylinder coordinates of one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderCoordinate {
    /// Angle around the axis, in `[0, 2π)`.
    pub theta: f64,
    /// Position along the axis, in `[0, 1]`.
    pub z: f64,
}

impl CylinderCoordinate {
    /// Cartesian point on the cylinder of radius `radius`.
    pub fn to_cartesian(&self, radius: f64) -> Point3<f64> {
        Point3::new(radius * self.theta.cos(), radius * self.theta.sin(), self.z)
    }
}

/// Per-vertex cylinder coordinates plus the boundary and seam used.
#[derive(Debug, Clone)]
pub struct CylinderMap {
    thetas: Vec<f64>,
    zs: Vec<f64>,
    cartesian: Option<Vec<Point3<f64>>>,
    radius: f64,
    seam: Vec<VertexId>,
    start: BoundaryLoop,
    end: BoundaryLoop,
}

impl CylinderMap {
    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.zs.len()
    }

    /// Whether the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.zs.is_empty()
    }

    /// Coordinates of vertex `v`.
    #[inline]
    pub fn coordinate(&self, v: VertexId) -> CylinderCoordinate {
        CylinderCoordinate {
            theta: self.thetas[v.index()],
            z: self.zs[v.index()],
        }
    }

    /// Angles, indexed by vertex.
    #[inline]
    pub fn thetas(&self) -> &[f64] {
        &self.thetas
    }

    /// Axial positions, indexed by vertex.
    #[inline]
    pub fn zs(&self) -> &[f64] {
        &self.zs
    }

    /// Cartesian cylinder points, if they were requested.
    #[inline]
    pub fn cartesian(&self) -> Option<&[Point3<f64>]> {
        self.cartesian.as_deref()
    }

    /// Radius of the target cylinder.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Seam vertices, from the start loop to the end loop. All have `θ = 0`.
    #[inline]
    pub fn seam(&self) -> &[VertexId] {
        &self.seam
    }

    /// The loop mapped to `z = 0`.
    #[inline]
    pub fn start_loop(&self) -> &BoundaryLoop {
        &self.start
    }

    /// The loop mapped to `z = 1`.
    #[inline]
    pub fn end_loop(&self) -> &BoundaryLoop {
        &self.end
    }

    /// Texture coordinates `(θ / 2π, z)`.
    pub fn to_uv_map(&self) -> UVMap {
        UVMap::new(
            self.thetas
                .iter()
                .zip(&self.zs)
                .map(|(&theta, &z)| Point2::new(theta / TAU, z))
                .collect(),
        )
    }
}

/// Compute the harmonic cylinder parameterization of a tube.
///
/// # Errors
///
/// - [`MeshError::InvalidParameter`] for invalid options
/// - [`MeshError::EmptyMesh`] / [`MeshError::Disconnected`] for unusable input
/// - [`MeshError::BoundaryTopology`] unless the mesh has exactly two
///   boundary loops and genus 0, or when no valid seam exists
/// - [`MeshError::SolverDivergence`] / [`MeshError::SolverSanity`] from the
///   two solves
pub fn cylinder_map(mesh: &HalfEdgeMesh, options: &CylinderMapOptions) -> Result<CylinderMap> {
    options.validate()?;

    if mesh.num_faces() == 0 {
        return Err(MeshError::EmptyMesh);
    }

    let (components, _) = mesh.connected_components();
    if components > 1 {
        return Err(MeshError::Disconnected { components });
    }

    let loops = cylinder_boundary_loops(mesh)?;

    // chi = 2 - 2g - b with b = 2
    let chi = mesh.euler_characteristic();
    if chi != 0 {
        return Err(MeshError::boundary(format!(
            "surface with two boundary loops has genus {} (expected 0)",
            -chi as f64 / 2.0
        )));
    }

    let (start, end) = order_loops(mesh, loops, options.loop_order)?;

    info!(
        "cylinder map: {} vertices, {} faces, loops of {} and {} vertices",
        mesh.num_vertices(),
        mesh.num_faces(),
        start.len(),
        end.len()
    );

    let laplacian = Laplacian::build(mesh, options.weight_mode)?;

    let mut z_conditions = BoundaryConditions::new();
    z_conditions
        .fix_all(start.vertices().iter().copied(), 0.0)
        .fix_all(end.vertices().iter().copied(), 1.0);

    let seam = Seam::build(mesh, &start, &end, &options.seam_policy)?;
    let mut theta_conditions = BoundaryConditions::new();
    theta_conditions.fix_all(seam.vertices().iter().copied(), 0.0);
    for (free, fixed) in seam.left_edges() {
        theta_conditions.add_ridge_offset(free, fixed, TAU);
    }

    let (z_field, theta_field) = solve_pair(
        &laplacian,
        &z_conditions,
        &theta_conditions,
        &options.solver,
        options.parallel,
    );
    let (z_field, theta_field) = (z_field?, theta_field?);

    let zs: Vec<f64> = z_field.into_vec().into_iter().map(|z| z.clamp(0.0, 1.0)).collect();
    let thetas: Vec<f64> = theta_field.into_vec().into_iter().map(wrap_angle).collect();

    let cartesian: Option<Vec<Point3<f64>>> = options.cartesian.then(|| {
        thetas
            .iter()
            .zip(&zs)
            .map(|(&theta, &z)| CylinderCoordinate { theta, z }.to_cartesian(options.radius))
            .collect()
    });

    info!(
        "cylinder map done: seam of {} vertices, {} ridge offsets",
        seam.vertices().len(),
        theta_conditions.num_ridge_offsets()
    );

    Ok(CylinderMap {
        thetas,
        zs,
        cartesian,
        radius: options.radius,
        seam: seam.into_vertices(),
        start,
        end,
    })
}

/// Solve the z and θ fields, concurrently when `parallel` is set.
fn solve_pair(
    laplacian: &Laplacian,
    z_conditions: &BoundaryConditions,
    theta_conditions: &BoundaryConditions,
    solver: &SolverOptions,
    parallel: bool,
) -> (Result<ScalarField>, Result<ScalarField>) {
    if parallel {
        rayon::join(
            || solve(laplacian, z_conditions, solver),
            || solve(laplacian, theta_conditions, solver),
        )
    } else {
        (
            solve(laplacian, z_conditions, solver),
            solve(laplacian, theta_conditions, solver),
        )
    }
}

/// Reduce a seam-cut angular field value into `[0, 2π)`.
///
/// Values within solver slack of either end of the cut map to 0.
fn wrap_angle(value: f64) -> f64 {
    let theta = value.clamp(0.0, TAU);
    if theta >= TAU {
        0.0
    } else {
        theta
    }
}

/// Label the two loops as (start, end).
fn order_loops(
    mesh: &HalfEdgeMesh,
    [a, b]: [BoundaryLoop; 2],
    order: LoopOrder,
) -> Result<(BoundaryLoop, BoundaryLoop)> {
    match order {
        LoopOrder::StartContains(v) => {
            let v = VertexId::new(v);
            if a.contains(v) {
                Ok((a, b))
            } else if b.contains(v) {
                Ok((b, a))
            } else {
                Err(MeshError::invalid_param(
                    "loop_order",
                    v.index(),
                    "vertex is not on a boundary loop",
                ))
            }
        }
        LoopOrder::PrincipalAxis => {
            let axis = principal_axis(mesh);
            let pa = axis.dot(&a.centroid(mesh).coords);
            let pb = axis.dot(&b.centroid(mesh).coords);

            if (pa - pb).abs() <= 1e-12 * (1.0 + pa.abs().max(pb.abs())) {
                warn!(
                    "boundary loops project equally on the principal axis; keeping extraction order"
                );
                Ok((a, b))
            } else if pa < pb {
                Ok((a, b))
            } else {
                Ok((b, a))
            }
        }
    }
}

/// Dominant eigenvector of the vertex covariance, signed so that its
/// largest-magnitude component is positive.
fn principal_axis(mesh: &HalfEdgeMesh) -> Vector3<f64> {
    let n = mesh.num_vertices().max(1) as f64;
    let mean = mesh
        .vertex_ids()
        .fold(Vector3::zeros(), |acc, v| acc + mesh.position(v).coords)
        / n;

    let covariance = mesh.vertex_ids().fold(Matrix3::zeros(), |acc, v| {
        let d = mesh.position(v).coords - mean;
        acc + d * d.transpose()
    }) / n;

    let eigen = SymmetricEigen::new(covariance);
    let dominant = eigen.eigenvalues.imax();
    let mut axis: Vector3<f64> = eigen.eigenvectors.column(dominant).into_owned();

    if axis[axis.iamax()] < 0.0 {
        axis = -axis;
    }
    axis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_triangles, build_tube, tube_geometry};
    use std::f64::consts::PI;

    const RINGS: usize = 10;
    const SEGMENTS: usize = 16;

    fn scenario_tube() -> HalfEdgeMesh {
        build_tube(RINGS, SEGMENTS, 1.0, 9.0).unwrap()
    }

    fn ring_and_segment(v: VertexId) -> (usize, usize) {
        (v.index() / SEGMENTS, v.index() % SEGMENTS)
    }

    /// Angular distance on the circle.
    fn angle_gap(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(TAU);
        d.min(TAU - d)
    }

    /// Flat square grid with the given cells removed.
    fn grid_with_holes(n: usize, holes: &[(usize, usize)]) -> HalfEdgeMesh {
        let mut vertices = Vec::new();
        for y in 0..=n {
            for x in 0..=n {
                vertices.push(Point3::new(x as f64, y as f64, 0.0));
            }
        }
        let mut faces = Vec::new();
        for y in 0..n {
            for x in 0..n {
                if holes.contains(&(x, y)) {
                    continue;
                }
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

    /// Torus with two cells removed: two boundary loops, genus 1.
    fn holed_torus() -> HalfEdgeMesh {
        let (nu, nv) = (12, 8);
        let mut vertices = Vec::new();
        for i in 0..nu {
            for j in 0..nv {
                let u = TAU * i as f64 / nu as f64;
                let v = TAU * j as f64 / nv as f64;
                let r = 3.0 + v.cos();
                vertices.push(Point3::new(r * u.cos(), r * u.sin(), v.sin()));
            }
        }
        let idx = |i: usize, j: usize| (i % nu) * nv + j % nv;
        let mut faces = Vec::new();
        for i in 0..nu {
            for j in 0..nv {
                if (i, j) == (0, 0) || (i, j) == (6, 4) {
                    continue;
                }
                faces.push([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
                faces.push([idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
            }
        }
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_scenario_tube() {
        let mesh = scenario_tube();
        let map = cylinder_map(&mesh, &CylinderMapOptions::default()).unwrap();

        assert_eq!(map.len(), 160);
        for v in mesh.vertex_ids() {
            let (k, j) = ring_and_segment(v);
            let c = map.coordinate(v);

            let expected_z = k as f64 / (RINGS - 1) as f64;
            assert!((c.z - expected_z).abs() < 1e-6, "z at ({}, {}) = {}", k, j, c.z);

            let expected_theta = TAU * j as f64 / SEGMENTS as f64;
            assert!(
                angle_gap(c.theta, expected_theta) < 1e-6,
                "theta at ({}, {}) = {}",
                k,
                j,
                c.theta
            );
        }

        for v in map.start_loop().vertices() {
            assert_eq!(map.coordinate(*v).z, 0.0);
        }
        for v in map.end_loop().vertices() {
            assert_eq!(map.coordinate(*v).z, 1.0);
        }
    }

    #[test]
    fn test_seam_is_first_column() {
        let mesh = scenario_tube();
        let map = cylinder_map(&mesh, &CylinderMapOptions::default()).unwrap();

        let expected: Vec<VertexId> = (0..RINGS).map(|k| VertexId::new(k * SEGMENTS)).collect();
        assert_eq!(map.seam(), expected.as_slice());
        for &v in map.seam() {
            assert_eq!(map.coordinate(v).theta, 0.0);
        }
        assert!(map.start_loop().contains(VertexId::new(0)));
        assert!(map.end_loop().contains(VertexId::new(150)));
    }

    #[test]
    fn test_theta_continuous_off_seam() {
        let (mut vertices, faces) = tube_geometry(8, 20, 1.0, 5.0).unwrap();
        // Wobble the radius so the solution is not trivially linear.
        for (i, p) in vertices.iter_mut().enumerate() {
            let s = 1.0 + 0.15 * ((i * 7) % 5) as f64 / 5.0;
            p.x *= s;
            p.y *= s;
        }
        let mesh = build_from_triangles(&vertices, &faces).unwrap();
        let map = cylinder_map(&mesh, &CylinderMapOptions::default()).unwrap();

        let on_seam: std::collections::HashSet<VertexId> = map.seam().iter().copied().collect();
        for he in mesh.edges() {
            let (a, b) = (mesh.origin(he), mesh.dest(he));
            if on_seam.contains(&a) || on_seam.contains(&b) {
                continue;
            }
            let gap = (map.coordinate(a).theta - map.coordinate(b).theta).abs();
            assert!(gap < PI, "jump of {} across {:?}-{:?}", gap, a, b);
        }

        for &t in map.thetas() {
            assert!((0.0..TAU).contains(&t));
        }
        for &z in map.zs() {
            assert!((0.0..=1.0).contains(&z));
        }
    }

    #[test]
    fn test_cartesian_output() {
        let mesh = scenario_tube();
        let options = CylinderMapOptions::default().with_radius(2.5);
        let map = cylinder_map(&mesh, &options).unwrap();

        let points = map.cartesian().unwrap();
        assert_eq!(points.len(), mesh.num_vertices());
        for (v, p) in mesh.vertex_ids().zip(points) {
            let c = map.coordinate(v);
            assert!((p.coords.xy().norm() - 2.5).abs() < 1e-12);
            assert_eq!(p.z, c.z);
        }
        assert_eq!(map.radius(), 2.5);

        let plain = cylinder_map(&mesh, &options.with_cartesian(false)).unwrap();
        assert!(plain.cartesian().is_none());
    }

    #[test]
    fn test_explicit_seam() {
        let mesh = scenario_tube();
        let column: Vec<usize> = (0..RINGS).map(|k| k * SEGMENTS + 5).collect();
        let options = CylinderMapOptions::default().with_seam(SeamPolicy::Explicit(column));
        let map = cylinder_map(&mesh, &options).unwrap();

        for v in mesh.vertex_ids() {
            let (_, j) = ring_and_segment(v);
            let expected = TAU * (j as f64 - 5.0) / SEGMENTS as f64;
            assert!(angle_gap(map.coordinate(v).theta, expected) < 1e-6);
        }
        assert_eq!(map.coordinate(VertexId::new(5)).theta, 0.0);
    }

    #[test]
    fn test_reversed_loop_order() {
        let mesh = scenario_tube();
        let options = CylinderMapOptions::default().with_loop_order(LoopOrder::StartContains(150));
        let map = cylinder_map(&mesh, &options).unwrap();

        for v in mesh.vertex_ids() {
            let (k, j) = ring_and_segment(v);
            let c = map.coordinate(v);
            assert!((c.z - (1.0 - k as f64 / 9.0)).abs() < 1e-6);

            // Axis now points down the tube, so the angle runs the other way.
            let expected = TAU * (SEGMENTS - j) as f64 / SEGMENTS as f64;
            assert!(angle_gap(c.theta, expected) < 1e-6);
        }
    }

    #[test]
    fn test_loop_order_vertex_not_on_boundary() {
        let mesh = scenario_tube();
        let options = CylinderMapOptions::default().with_loop_order(LoopOrder::StartContains(40));
        assert!(matches!(
            cylinder_map(&mesh, &options),
            Err(MeshError::InvalidParameter { name: "loop_order", .. })
        ));
    }

    #[test]
    fn test_principal_axis_of_tube() {
        let mesh = scenario_tube();
        let axis = principal_axis(&mesh);
        assert!((axis.z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_uniform_weights() {
        let mesh = scenario_tube();
        let options = CylinderMapOptions::default().with_weight_mode(WeightMode::Uniform);
        let map = cylinder_map(&mesh, &options).unwrap();

        for v in mesh.vertex_ids() {
            let (k, _) = ring_and_segment(v);
            assert!((map.coordinate(v).z - k as f64 / 9.0).abs() < 1e-6);
        }
        for &t in map.thetas() {
            assert!((0.0..TAU).contains(&t));
        }
    }

    #[test]
    fn test_flat_annulus() {
        // A square with a square hole is a valid (flat) tube.
        let mesh = grid_with_holes(5, &[(2, 2)]);
        let map = cylinder_map(&mesh, &CylinderMapOptions::default()).unwrap();

        assert_eq!(map.start_loop().len() + map.end_loop().len(), 20 + 4);
        for &z in map.zs() {
            assert!((0.0..=1.0).contains(&z));
        }
    }

    #[test]
    fn test_three_loops_rejected() {
        let mesh = grid_with_holes(5, &[(1, 1), (3, 3)]);
        let err = cylinder_map(&mesh, &CylinderMapOptions::default()).unwrap_err();
        assert!(matches!(err, MeshError::BoundaryTopology { .. }), "{}", err);
    }

    #[test]
    fn test_closed_surface_rejected() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert!(matches!(
            cylinder_map(&mesh, &CylinderMapOptions::default()),
            Err(MeshError::BoundaryTopology { .. })
        ));
    }

    #[test]
    fn test_genus_rejected() {
        let mesh = holed_torus();
        let err = cylinder_map(&mesh, &CylinderMapOptions::default()).unwrap_err();
        assert!(err.to_string().contains("genus"), "{}", err);
    }

    #[test]
    fn test_disconnected_rejected() {
        let (mut vertices, mut faces) = tube_geometry(3, 8, 1.0, 2.0).unwrap();
        let (more_vertices, more_faces) = tube_geometry(3, 8, 1.0, 2.0).unwrap();
        let offset = vertices.len();
        vertices.extend(more_vertices.into_iter().map(|p| p + Vector3::new(10.0, 0.0, 0.0)));
        faces.extend(more_faces.into_iter().map(|f| f.map(|i| i + offset)));
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert!(matches!(
            cylinder_map(&mesh, &CylinderMapOptions::default()),
            Err(MeshError::Disconnected { components: 2 })
        ));
    }

    #[test]
    fn test_deterministic() {
        let mesh = scenario_tube();
        let a = cylinder_map(&mesh, &CylinderMapOptions::default()).unwrap();
        let b = cylinder_map(&mesh, &CylinderMapOptions::default()).unwrap();
        let c = cylinder_map(&mesh, &CylinderMapOptions::default().sequential()).unwrap();

        assert_eq!(a.thetas(), b.thetas());
        assert_eq!(a.zs(), b.zs());
        assert_eq!(a.thetas(), c.thetas());
        assert_eq!(a.zs(), c.zs());
    }

    #[test]
    fn test_iteration_cap() {
        let mesh = scenario_tube();
        let options = CylinderMapOptions::default().with_max_iterations(1);
        assert!(matches!(
            cylinder_map(&mesh, &options),
            Err(MeshError::SolverDivergence { .. })
        ));
    }

    #[test]
    fn test_invalid_radius() {
        let mesh = scenario_tube();
        for radius in [0.0, -1.0, f64::INFINITY] {
            let options = CylinderMapOptions::default().with_radius(radius);
            assert!(matches!(
                cylinder_map(&mesh, &options),
                Err(MeshError::InvalidParameter { name: "radius", .. })
            ));
        }
    }

    #[test]
    fn test_uv_map() {
        let mesh = scenario_tube();
        let map = cylinder_map(&mesh, &CylinderMapOptions::default()).unwrap();
        let uv = map.to_uv_map();

        assert_eq!(uv.len(), mesh.num_vertices());
        let (min, max) = uv.bounding_box().unwrap();
        assert!(min.x >= 0.0 && max.x < 1.0);
        assert_eq!((min.y, max.y), (0.0, 1.0));

        let p = uv.get(VertexId::new(2 * SEGMENTS + 8));
        assert!((p.x - 0.5).abs() < 1e-6);
        assert!((p.y - 2.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_angle() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert_eq!(wrap_angle(-1e-12), 0.0);
        assert_eq!(wrap_angle(TAU), 0.0);
        assert_eq!(wrap_angle(TAU + 1e-9), 0.0);
        assert_eq!(wrap_angle(1.0), 1.0);
    }
}
