//! Mesh processing algorithms.
//!
//! - **Boundary**: open-boundary loop extraction
//! - **Laplacian**: cotangent and uniform discrete Laplacians
//! - **Harmonic**: Dirichlet problems on the Laplacian, with ridge offsets
//! - **Parameterization**: cylinder and disk harmonic maps
//! - **Geodesics**: Dijkstra shortest paths along edges
//! - **Sparse**: CSR storage and preconditioned conjugate gradient

pub mod boundary;
pub mod geodesic;
pub mod harmonic;
pub mod laplacian;
pub mod parameterize;
pub mod sparse;
