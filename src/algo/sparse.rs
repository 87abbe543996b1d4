//! Sparse matrix storage and an iterative solver.
//!
//! This module provides a lightweight sparse matrix implementation (CSR format)
//! and a Jacobi-preconditioned conjugate gradient solver for symmetric positive
//! definite systems.

use log::debug;
use nalgebra::DVector;
use rayon::prelude::*;

use crate::error::{MeshError, Result};

/// Compressed Sparse Row (CSR) matrix.
///
/// Stores a sparse matrix in CSR format for efficient matrix-vector multiplication.
/// Column indices are sorted within each row.
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    cols: usize,
    /// Row pointers: row_ptr[i] is the index in col_idx/values where row i starts.
    /// Length is rows + 1, with row_ptr[rows] = nnz.
    row_ptr: Vec<usize>,
    /// Column indices for each non-zero value.
    col_idx: Vec<usize>,
    /// Non-zero values.
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Create a CSR matrix from triplets (row, col, value).
    ///
    /// Duplicate entries at the same (row, col) are summed.
    pub fn from_triplets(rows: usize, cols: usize, mut triplets: Vec<(usize, usize, f64)>) -> Self {
        triplets.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut row_ptr = vec![0usize; rows + 1];
        let mut col_idx: Vec<usize> = Vec::with_capacity(triplets.len());
        let mut values: Vec<f64> = Vec::with_capacity(triplets.len());
        let mut last: Option<(usize, usize)> = None;

        for (row, col, val) in triplets {
            debug_assert!(row < rows && col < cols, "triplet ({}, {}) out of range", row, col);

            if last == Some((row, col)) {
                if let Some(v) = values.last_mut() {
                    *v += val;
                }
                continue;
            }

            col_idx.push(col);
            values.push(val);
            row_ptr[row + 1] += 1;
            last = Some((row, col));
        }

        // Per-row counts -> offsets
        for r in 0..rows {
            row_ptr[r + 1] += row_ptr[r];
        }

        Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Get the number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Get the number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Iterate over the stored `(column, value)` pairs of a row.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Get the entry at `(i, j)`, or 0 if it is not stored.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        match self.col_idx[range.clone()].binary_search(&j) {
            Ok(k) => self.values[range.start + k],
            Err(_) => 0.0,
        }
    }

    /// Extract the main diagonal.
    pub fn diagonal(&self) -> DVector<f64> {
        let n = self.rows.min(self.cols);
        DVector::from_iterator(n, (0..n).map(|i| self.get(i, i)))
    }

    #[inline]
    fn row_dot(&self, i: usize, x: &DVector<f64>) -> f64 {
        let mut sum = 0.0;
        for k in self.row_ptr[i]..self.row_ptr[i + 1] {
            sum += self.values[k] * x[self.col_idx[k]];
        }
        sum
    }

    /// Multiply matrix by vector: y = A * x.
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        assert_eq!(x.len(), self.cols, "Vector dimension mismatch");
        DVector::from_iterator(self.rows, (0..self.rows).map(|i| self.row_dot(i, x)))
    }

    /// Multiply matrix by vector with rows distributed over the rayon pool.
    ///
    /// Each row is still reduced sequentially, so the result is bitwise equal
    /// to [`mul_vec`](Self::mul_vec).
    pub fn par_mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        assert_eq!(x.len(), self.cols, "Vector dimension mismatch");
        let y: Vec<f64> = (0..self.rows)
            .into_par_iter()
            .map(|i| self.row_dot(i, x))
            .collect();
        DVector::from_vec(y)
    }

    /// Multiply, choosing the parallel or sequential path.
    #[inline]
    pub fn mul_vec_with(&self, x: &DVector<f64>, parallel: bool) -> DVector<f64> {
        if parallel {
            self.par_mul_vec(x)
        } else {
            self.mul_vec(x)
        }
    }
}

/// Outcome of a converged conjugate gradient run.
#[derive(Debug, Clone)]
pub struct CgSolution {
    /// The solution vector.
    pub x: DVector<f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Final relative residual `|b - Ax| / |b|`.
    pub residual: f64,
}

/// Solve A*x = b using Jacobi-preconditioned conjugate gradient.
///
/// Requires A to be symmetric positive definite.
///
/// # Arguments
///
/// * `a` - The system matrix (must be symmetric positive definite)
/// * `b` - The right-hand side vector
/// * `x0` - Optional initial guess (zeros if None)
/// * `max_iter` - Maximum number of iterations
/// * `tolerance` - Convergence tolerance (relative residual norm)
/// * `parallel` - Run matrix-vector products on the rayon pool
///
/// # Returns
///
/// The solution with its iteration count and residual, or
/// [`MeshError::SolverDivergence`] if the tolerance is not reached within
/// `max_iter` iterations.
pub fn conjugate_gradient(
    a: &CsrMatrix,
    b: &DVector<f64>,
    x0: Option<&DVector<f64>>,
    max_iter: usize,
    tolerance: f64,
    parallel: bool,
) -> Result<CgSolution> {
    let n = b.len();
    assert_eq!(a.nrows(), n, "Matrix-vector dimension mismatch");
    assert_eq!(a.ncols(), n, "Matrix must be square");

    let b_norm = b.norm();
    if b_norm < 1e-300 {
        // The unique solution of an SPD system with zero right-hand side.
        return Ok(CgSolution {
            x: DVector::zeros(n),
            iterations: 0,
            residual: 0.0,
        });
    }

    let mut x = match x0 {
        Some(x0) => x0.clone(),
        None => DVector::zeros(n),
    };

    // Inverse diagonal; rows without a usable pivot are left unscaled.
    let inv_diag = a.diagonal().map(|d| if d.abs() > 1e-300 { 1.0 / d } else { 1.0 });

    let mut r = b - a.mul_vec_with(&x, parallel);
    let mut residual = r.norm() / b_norm;
    if residual < tolerance {
        return Ok(CgSolution {
            x,
            iterations: 0,
            residual,
        });
    }

    let mut z = r.component_mul(&inv_diag);
    let mut p = z.clone();
    let mut rz = r.dot(&z);
    let mut iterations = 0;

    while iterations < max_iter {
        iterations += 1;

        let ap = a.mul_vec_with(&p, parallel);
        let p_ap = p.dot(&ap);
        if p_ap.is_nan() || p_ap <= 1e-300 {
            // Loss of positive definiteness or complete stagnation.
            break;
        }
        let alpha = rz / p_ap;

        x.axpy(alpha, &p, 1.0);
        r.axpy(-alpha, &ap, 1.0);

        residual = r.norm() / b_norm;
        if residual < tolerance {
            debug!(
                "conjugate gradient converged in {} iterations (residual {:.3e})",
                iterations, residual
            );
            return Ok(CgSolution {
                x,
                iterations,
                residual,
            });
        }

        z = r.component_mul(&inv_diag);
        let rz_new = r.dot(&z);
        let beta = rz_new / rz;
        p = &z + beta * &p;
        rz = rz_new;
    }

    Err(MeshError::SolverDivergence {
        iterations,
        residual,
    })
}
