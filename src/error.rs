//! Error types for tubemap.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side
//! is a single [`MeshError`] enum. Variants fall into four families:
//!
//! - invalid mesh input (bad indices, degenerate or non-manifold triangles,
//!   disconnected surfaces), rejected before any solve,
//! - boundary topology problems (wrong loop count, unreachable seam),
//! - solver divergence (iteration cap reached),
//! - solver sanity failures (maximum-principle violations).

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building meshes or computing harmonic maps.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// The mesh has non-manifold topology.
    #[error("mesh has non-manifold topology: {details}")]
    NonManifold {
        /// Description of the non-manifold condition.
        details: String,
    },

    /// An edge is shared by more than two faces, or by two faces with
    /// inconsistent winding.
    #[error("edge ({v0}, {v1}) is shared by more than two faces or has inconsistent winding")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// The mesh consists of more than one connected component.
    #[error("mesh is not connected ({components} components)")]
    Disconnected {
        /// Number of connected components found.
        components: usize,
    },

    /// The open boundary does not have the shape the mapping requires.
    #[error("invalid boundary topology: {details}")]
    BoundaryTopology {
        /// Description of the problem.
        details: String,
    },

    /// The iterative solver hit its iteration cap before converging.
    #[error("solver did not converge after {iterations} iterations (relative residual {residual:.3e})")]
    SolverDivergence {
        /// Number of iterations attempted.
        iterations: usize,
        /// Relative residual norm at the last iteration.
        residual: f64,
    },

    /// A solved field violates the discrete maximum principle.
    #[error("harmonic field value {value} at vertex {vertex} lies outside boundary range [{min}, {max}]")]
    SolverSanity {
        /// Offending vertex index.
        vertex: usize,
        /// The solved value.
        value: f64,
        /// Smallest prescribed boundary value.
        min: f64,
        /// Largest prescribed boundary value.
        max: f64,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a boundary topology error.
    pub fn boundary(details: impl Into<String>) -> Self {
        MeshError::BoundaryTopology {
            details: details.into(),
        }
    }

    /// Whether this error reports malformed mesh input (indices, degenerate
    /// faces, non-manifold or disconnected topology).
    pub fn is_invalid_mesh(&self) -> bool {
        matches!(
            self,
            MeshError::EmptyMesh
                | MeshError::InvalidVertexIndex { .. }
                | MeshError::DegenerateFace { .. }
                | MeshError::NonManifold { .. }
                | MeshError::NonManifoldEdge { .. }
                | MeshError::Disconnected { .. }
        )
    }
}
