//! Surface parameterization by harmonic maps.
//!
//! # Available Algorithms
//!
//! - [`cylinder_map`]: tube (two boundary loops) onto the unit cylinder,
//!   giving each vertex an angle `θ` and an axial position `z`
//! - [`disk_map`]: disk (one boundary loop) onto the unit disk, as UV
//!   coordinates in `[0, 1]²`
//!
//! Both are built on [`harmonic_field`](crate::algo::harmonic::harmonic_field)
//! style solves against one shared Laplacian.
//!
//! # Example
//!
//! ```
//! use tubemap::prelude::*;
//! use tubemap::algo::parameterize::{cylinder_map, CylinderMapOptions, SeamPolicy};
//!
//! let tube = build_tube(6, 12, 1.0, 5.0).unwrap();
//!
//! let options = CylinderMapOptions::default()
//!     .with_seam(SeamPolicy::Explicit(vec![3, 15, 27, 39, 51, 63]))
//!     .with_cartesian(false);
//! let map = cylinder_map(&tube, &options).unwrap();
//!
//! assert_eq!(map.coordinate(VertexId::new(27)).theta, 0.0);
//! let uv = map.to_uv_map();
//! assert_eq!(uv.len(), tube.num_vertices());
//! ```

mod cylinder;
mod disk;
mod seam;
mod uv;

pub use cylinder::{cylinder_map, CylinderCoordinate, CylinderMap, CylinderMapOptions, LoopOrder};
pub use disk::disk_map;
pub use seam::{Seam, SeamPolicy};
pub use uv::UVMap;
