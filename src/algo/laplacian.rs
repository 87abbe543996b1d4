//! Discrete Laplace-Beltrami operator.
//!
//! The Laplacian `L` of a mesh with `N` vertices is an `N × N` symmetric
//! sparse matrix. Entry `(i, j)` is the weight of edge `ij` if the two
//! vertices share an edge, the diagonal holds the negated row sum, and every
//! other entry is zero. A field `f` is discretely harmonic at vertex `i` when
//! `(L f)_i = 0`.
//!
//! # Weights
//!
//! - [`WeightMode::Cotangent`]: `w_ij = ½ (cot α_ij + cot β_ij)` where `α`
//!   and `β` are the angles opposite edge `ij` in its one or two triangles.
//!   Weights are floored at [`COTANGENT_WEIGHT_FLOOR`] so obtuse and
//!   near-degenerate triangles cannot produce non-positive weights.
//! - [`WeightMode::Uniform`]: `w_ij = 1` (combinatorial graph Laplacian).
//!
//! # Example
//!
//! ```
//! use tubemap::algo::laplacian::{Laplacian, WeightMode};
//! use tubemap::mesh::build_tube;
//!
//! let tube = build_tube(4, 8, 1.0, 3.0).unwrap();
//! let lap = Laplacian::build(&tube, WeightMode::Cotangent).unwrap();
//! assert_eq!(lap.dim(), 32);
//! ```

use nalgebra::DVector;

use super::sparse::CsrMatrix;
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeId, HalfEdgeMesh};

/// Lower bound applied to every cotangent edge weight.
pub const COTANGENT_WEIGHT_FLOOR: f64 = 1e-8;

/// Edge weighting scheme for the Laplacian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeightMode {
    /// Cotangent weights (geometry-aware, default).
    #[default]
    Cotangent,
    /// Unit weights (connectivity only).
    Uniform,
}

/// Sparse symmetric Laplacian of a triangle mesh.
///
/// Built once per mesh and never mutated; solvers copy what they need.
#[derive(Debug, Clone)]
pub struct Laplacian {
    matrix: CsrMatrix,
    mode: WeightMode,
}

impl Laplacian {
    /// Assemble the Laplacian of `mesh` with the given weights.
    ///
    /// Returns [`MeshError::EmptyMesh`] for a mesh without faces.
    pub fn build(mesh: &HalfEdgeMesh, mode: WeightMode) -> Result<Self> {
        if mesh.num_faces() == 0 {
            return Err(MeshError::EmptyMesh);
        }

        let n = mesh.num_vertices();
        let mut triplets = Vec::with_capacity(mesh.num_edges() * 4);

        for he in mesh.edges() {
            let i = mesh.origin(he).index();
            let j = mesh.dest(he).index();
            let w = edge_weight(mesh, he, mode);

            triplets.push((i, j, w));
            triplets.push((j, i, w));
            triplets.push((i, i, -w));
            triplets.push((j, j, -w));
        }

        Ok(Self {
            matrix: CsrMatrix::from_triplets(n, n, triplets),
            mode,
        })
    }

    /// Number of rows (and columns), i.e. the vertex count.
    #[inline]
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// The weighting scheme this Laplacian was built with.
    #[inline]
    pub fn mode(&self) -> WeightMode {
        self.mode
    }

    /// Weight of edge `ij`, or 0 if `i` and `j` are not adjacent.
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        if i == j {
            0.0
        } else {
            self.matrix.get(i, j)
        }
    }

    /// Diagonal entry of row `i` (the negated sum of its edge weights).
    #[inline]
    pub fn diagonal(&self, i: usize) -> f64 {
        self.matrix.get(i, i)
    }

    /// Stored `(column, value)` entries of row `i`, diagonal included.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.matrix.row(i)
    }

    /// Compute `L f`.
    pub fn apply(&self, f: &DVector<f64>) -> DVector<f64> {
        self.matrix.mul_vec(f)
    }

    /// The underlying CSR matrix.
    #[inline]
    pub fn matrix(&self) -> &CsrMatrix {
        &self.matrix
    }
}

/// Weight of the undirected edge carried by `he`.
pub fn edge_weight(mesh: &HalfEdgeMesh, he: HalfEdgeId, mode: WeightMode) -> f64 {
    match mode {
        WeightMode::Uniform => 1.0,
        WeightMode::Cotangent => {
            // Boundary half-edges contribute a zero cotangent.
            let cot_sum = mesh.corner_cotangent(he) + mesh.corner_cotangent(mesh.twin(he));
            (0.5 * cot_sum).max(COTANGENT_WEIGHT_FLOOR)
        }
    }
}
