//! UV coordinate storage.
//!
//! This module provides the [`UVMap`] type for storing 2D parameterization
//! coordinates for mesh vertices.

use nalgebra::Point2;

use crate::mesh::VertexId;

/// UV coordinates for mesh vertices.
///
/// Produced by [`disk_map`](super::disk_map) and by
/// [`CylinderMap::to_uv_map`](super::CylinderMap::to_uv_map). Both place
/// coordinates in `[0, 1]²`.
///
/// # Example
///
/// ```
/// use tubemap::algo::parameterize::UVMap;
/// use tubemap::mesh::VertexId;
/// use nalgebra::Point2;
///
/// let mut uv = UVMap::zeros(3);
/// uv.set(VertexId::new(1), Point2::new(0.5, 0.25));
/// assert_eq!(uv.get(VertexId::new(1)).y, 0.25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UVMap {
    /// UV coordinates indexed by vertex ID.
    coords: Vec<Point2<f64>>,
}

impl UVMap {
    /// Create a new UV map with the given coordinates.
    ///
    /// The coordinates are indexed by vertex ID (index 0 corresponds to
    /// vertex 0, etc.).
    pub fn new(coords: Vec<Point2<f64>>) -> Self {
        Self { coords }
    }

    /// Create a UV map filled with zeros.
    pub fn zeros(n: usize) -> Self {
        Self {
            coords: vec![Point2::origin(); n],
        }
    }

    /// Get the UV coordinates for a vertex.
    #[inline]
    pub fn get(&self, v: VertexId) -> Point2<f64> {
        self.coords[v.index()]
    }

    /// Set the UV coordinates for a vertex.
    #[inline]
    pub fn set(&mut self, v: VertexId, uv: Point2<f64>) {
        self.coords[v.index()] = uv;
    }

    /// Get the number of UV coordinates.
    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Iterate over all UV coordinates with their vertex IDs.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, Point2<f64>)> + '_ {
        self.coords
            .iter()
            .enumerate()
            .map(|(i, &uv)| (VertexId::new(i), uv))
    }

    /// Get the raw coordinates slice.
    pub fn as_slice(&self) -> &[Point2<f64>] {
        &self.coords
    }

    /// Compute the bounding box of the UV coordinates.
    ///
    /// Returns `None` if the UV map is empty.
    pub fn bounding_box(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        let first = *self.coords.first()?;
        let (mut min, mut max) = (first, first);

        for uv in &self.coords {
            min.x = min.x.min(uv.x);
            min.y = min.y.min(uv.y);
            max.x = max.x.max(uv.x);
            max.y = max.y.max(uv.y);
        }

        Some((min, max))
    }

    /// Compute the total (unsigned) area in UV space of the given triangles.
    pub fn total_area(&self, faces: &[[usize; 3]]) -> f64 {
        faces
            .iter()
            .map(|face| self.signed_area(face).abs())
            .sum()
    }

    /// Signed UV-space area of one triangle; positive when counter-clockwise.
    pub fn signed_area(&self, face: &[usize; 3]) -> f64 {
        let p0 = self.coords[face[0]];
        let p1 = self.coords[face[1]];
        let p2 = self.coords[face[2]];
        0.5 * ((p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y))
    }
}
