//! Dirichlet-constrained harmonic fields.
//!
//! A field `f` over the vertices is harmonic when `L f = 0` at every vertex
//! that is not pinned by a boundary condition. Given the pinned values, the
//! harmonic field is unique and obeys the discrete maximum principle: every
//! value lies between the smallest and largest prescribed value.
//!
//! # Solve
//!
//! Pinned rows become identity rows and pinned columns are moved to the
//! right-hand side, which leaves a symmetric positive definite system for the
//! free vertices. That system is solved with Jacobi-preconditioned conjugate
//! gradient from [`sparse`](super::sparse).
//!
//! # Ridge offsets
//!
//! A ridge offset `(free, fixed) → δ` makes the free vertex see the fixed
//! vertex at `value + δ`. This is how a periodic coordinate is solved on a
//! surface without duplicating the vertices along its cut.
//!
//! # Example
//!
//! ```
//! use tubemap::algo::harmonic::{harmonic_field, BoundaryConditions, HarmonicOptions};
//! use tubemap::mesh::{build_tube, VertexId};
//!
//! let tube = build_tube(5, 12, 1.0, 4.0).unwrap();
//! let mut conditions = BoundaryConditions::new();
//! for j in 0..12 {
//!     conditions.fix(VertexId::new(j), 0.0);
//!     conditions.fix(VertexId::new(48 + j), 1.0);
//! }
//!
//! let field = harmonic_field(&tube, &conditions, &HarmonicOptions::default()).unwrap();
//! assert!((field.get(VertexId::new(24)) - 0.5).abs() < 1e-6);
//! ```

use std::collections::{BTreeMap, HashMap};

use log::{debug, info};
use nalgebra::DVector;

use super::laplacian::{Laplacian, WeightMode};
use super::sparse::{conjugate_gradient, CsrMatrix};
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, VertexId};

/// Options for the linear solve.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Relative residual at which conjugate gradient stops (default: 1e-10).
    pub tolerance: f64,

    /// Iteration cap before reporting divergence (default: 10 000).
    pub max_iterations: usize,

    /// Slack allowed by the maximum-principle check, relative to the range
    /// of boundary values (default: 1e-6).
    pub sanity_tolerance: f64,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 10_000,
            sanity_tolerance: 1e-6,
            parallel: true,
        }
    }
}

impl SolverOptions {
    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the maximum-principle slack.
    pub fn with_sanity_tolerance(mut self, sanity_tolerance: f64) -> Self {
        self.sanity_tolerance = sanity_tolerance;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(MeshError::invalid_param("tolerance", self.tolerance, "must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(MeshError::invalid_param("max_iterations", 0, "must be at least 1"));
        }
        if !(self.sanity_tolerance.is_finite() && self.sanity_tolerance >= 0.0) {
            return Err(MeshError::invalid_param(
                "sanity_tolerance",
                self.sanity_tolerance,
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Options for [`harmonic_field`].
#[derive(Debug, Clone, Default)]
pub struct HarmonicOptions {
    /// Laplacian edge weights (default: cotangent).
    pub weight_mode: WeightMode,

    /// Linear solve settings.
    pub solver: SolverOptions,
}

impl HarmonicOptions {
    /// Set the Laplacian weighting.
    pub fn with_weight_mode(mut self, weight_mode: WeightMode) -> Self {
        self.weight_mode = weight_mode;
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

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.solver.parallel = parallel;
        self
    }
}

/// Dirichlet boundary conditions: pinned vertex values plus ridge offsets.
#[derive(Debug, Clone, Default)]
pub struct BoundaryConditions {
    values: BTreeMap<usize, f64>,
    offsets: HashMap<(usize, usize), f64>,
}

impl BoundaryConditions {
    /// Create an empty set of conditions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `v` to `value`, replacing any earlier value.
    pub fn fix(&mut self, v: VertexId, value: f64) -> &mut Self {
        self.values.insert(v.index(), value);
        self
    }

    /// Pin every vertex yielded by `vertices` to `value`.
    pub fn fix_all(&mut self, vertices: impl IntoIterator<Item = VertexId>, value: f64) -> &mut Self {
        for v in vertices {
            self.fix(v, value);
        }
        self
    }

    /// Make `free` see the pinned vertex `fixed` at its value plus `offset`.
    pub fn add_ridge_offset(&mut self, free: VertexId, fixed: VertexId, offset: f64) -> &mut Self {
        self.offsets.insert((free.index(), fixed.index()), offset);
        self
    }

    /// Whether `v` is pinned.
    #[inline]
    pub fn is_fixed(&self, v: VertexId) -> bool {
        self.values.contains_key(&v.index())
    }

    /// The pinned value of `v`, if any.
    #[inline]
    pub fn value(&self, v: VertexId) -> Option<f64> {
        self.values.get(&v.index()).copied()
    }

    /// The ridge offset between `free` and `fixed` (0 if none).
    #[inline]
    pub fn ridge_offset(&self, free: VertexId, fixed: VertexId) -> f64 {
        self.offsets
            .get(&(free.index(), fixed.index()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Number of pinned vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no vertex is pinned.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of ridge offsets.
    #[inline]
    pub fn num_ridge_offsets(&self) -> usize {
        self.offsets.len()
    }

    /// Pinned vertices and their values, in vertex order.
    pub fn fixed(&self) -> impl Iterator<Item = (VertexId, f64)> + '_ {
        self.values.iter().map(|(&i, &v)| (VertexId::new(i), v))
    }

    /// Smallest and largest value any free vertex can see on the boundary,
    /// ridge offsets included.
    pub fn range(&self) -> Option<(f64, f64)> {
        let seen = self.values.values().copied().chain(
            self.offsets
                .iter()
                .filter_map(|(&(_, fixed), &offset)| self.values.get(&fixed).map(|v| v + offset)),
        );

        seen.fold(None, |acc, x| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
        })
    }

    fn validate(&self, n: usize) -> Result<()> {
        if self.values.is_empty() {
            return Err(MeshError::invalid_param(
                "boundary conditions",
                "none",
                "at least one vertex must be fixed",
            ));
        }
        if let Some((&i, _)) = self.values.range(n..).next() {
            return Err(MeshError::invalid_param(
                "fixed vertex",
                i,
                "index out of range",
            ));
        }
        if let Some((_, &v)) = self.values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(MeshError::invalid_param("fixed value", v, "must be finite"));
        }
        for (&(free, fixed), &offset) in &self.offsets {
            if free >= n || self.values.contains_key(&free) {
                return Err(MeshError::invalid_param(
                    "ridge offset",
                    free,
                    "must start at a free vertex",
                ));
            }
            if !self.values.contains_key(&fixed) {
                return Err(MeshError::invalid_param(
                    "ridge offset",
                    fixed,
                    "must end at a fixed vertex",
                ));
            }
            if !offset.is_finite() {
                return Err(MeshError::invalid_param("ridge offset", offset, "must be finite"));
            }
        }
        Ok(())
    }
}

/// A real value per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    values: Vec<f64>,
}

impl ScalarField {
    /// Wrap raw per-vertex values.
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Value at vertex `v`.
    #[inline]
    pub fn get(&self, v: VertexId) -> f64 {
        self.values[v.index()]
    }

    /// All values, indexed by vertex.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the field is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest value (infinity for an empty field).
    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest value (negative infinity for an empty field).
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Take the values out of the field.
    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}

/// Solve `L f = 0` subject to `conditions`.
///
/// Pinned vertices keep their values exactly.
///
/// # Errors
///
/// - [`MeshError::InvalidParameter`] for invalid options, when nothing is
///   pinned, or when a condition references a vertex out of range
/// - [`MeshError::SolverDivergence`] when the iteration cap is reached
/// - [`MeshError::SolverSanity`] when the result is non-finite or leaves the
///   range of the boundary values
pub fn solve(
    laplacian: &Laplacian,
    conditions: &BoundaryConditions,
    options: &SolverOptions,
) -> Result<ScalarField> {
    options.validate()?;

    let n = laplacian.dim();
    conditions.validate(n)?;

    let (system, rhs, x0) = assemble_system(laplacian, conditions);

    let solution = conjugate_gradient(
        &system,
        &rhs,
        Some(&x0),
        options.max_iterations,
        options.tolerance,
        options.parallel,
    )?;

    debug!(
        "harmonic solve: {} vertices, {} fixed, {} iterations, residual {:.3e}",
        n,
        conditions.len(),
        solution.iterations,
        solution.residual
    );

    let mut values: Vec<f64> = solution.x.iter().copied().collect();
    for (v, value) in conditions.fixed() {
        values[v.index()] = value;
    }

    // validate() guarantees at least one pinned value.
    let (lo, hi) = conditions.range().unwrap_or((0.0, 0.0));
    check_maximum_principle(&values, lo, hi, options.sanity_tolerance)?;

    Ok(ScalarField { values })
}

/// Build the Laplacian of `mesh` and solve one harmonic field on it.
///
/// This is the generic entry point; it carries no knowledge of what the
/// boundary values mean.
pub fn harmonic_field(
    mesh: &HalfEdgeMesh,
    conditions: &BoundaryConditions,
    options: &HarmonicOptions,
) -> Result<ScalarField> {
    info!(
        "harmonic field: {} vertices, {} fixed, {:?} weights",
        mesh.num_vertices(),
        conditions.len(),
        options.weight_mode
    );

    let laplacian = Laplacian::build(mesh, options.weight_mode)?;
    solve(&laplacian, conditions, &options.solver)
}

/// Negated Laplacian restricted to the free vertices, with identity rows for
/// pinned vertices. Returns the matrix, right-hand side and initial guess.
fn assemble_system(
    laplacian: &Laplacian,
    conditions: &BoundaryConditions,
) -> (CsrMatrix, DVector<f64>, DVector<f64>) {
    let n = laplacian.dim();
    let pinned: Vec<Option<f64>> = (0..n).map(|i| conditions.value(VertexId::new(i))).collect();

    let mut triplets = Vec::with_capacity(laplacian.matrix().nnz());
    let mut rhs = DVector::zeros(n);
    let mut x0 = DVector::zeros(n);

    for i in 0..n {
        if let Some(value) = pinned[i] {
            triplets.push((i, i, 1.0));
            rhs[i] = value;
            x0[i] = value;
            continue;
        }

        for (j, l_ij) in laplacian.row(i) {
            match pinned[j] {
                Some(value) => {
                    let seen = value + conditions.ridge_offset(VertexId::new(i), VertexId::new(j));
                    rhs[i] += l_ij * seen;
                }
                None => triplets.push((i, j, -l_ij)),
            }
        }
    }

    (CsrMatrix::from_triplets(n, n, triplets), rhs, x0)
}

/// Every value must be finite and within `[lo - δ, hi + δ]`, where
/// `δ = tolerance · max(hi - lo, 1)`.
fn check_maximum_principle(values: &[f64], lo: f64, hi: f64, tolerance: f64) -> Result<()> {
    let slack = tolerance * (hi - lo).max(1.0);

    for (vertex, &value) in values.iter().enumerate() {
        if !value.is_finite() || value < lo - slack || value > hi + slack {
            return Err(MeshError::SolverSanity {
                vertex,
                value,
                min: lo,
                max: hi,
            });
        }
    }

    Ok(())
}
