//! Landmark point type.
//!
//! Coordinates are normalized: `(0.0, 0.0)` is the top-left of the image,
//! `(1.0, 1.0)` the bottom-right. `z` is relative depth.

use serde::{Deserialize, Serialize};

/// A normalized 3D landmark.
///
/// Serialized as a compact `[x, y, z]` array to keep frame streams small.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A point on the image plane (zero depth).
    pub fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Euclidean distance in the image plane, ignoring depth.
    pub fn distance_2d(&self, other: &Point3D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Full Euclidean distance including depth.
    pub fn distance_3d(&self, other: &Point3D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }

    /// Component-wise arithmetic mean. Returns `None` for an empty slice.
    ///
    /// Computed incrementally, so a run of identical points yields exactly
    /// that point.
    pub fn mean(points: &[Point3D]) -> Option<Point3D> {
        let (first, rest) = points.split_first()?;
        let mut m = *first;
        for (i, p) in rest.iter().enumerate() {
            let k = (i + 2) as f64;
            m.x += (p.x - m.x) / k;
            m.y += (p.y - m.y) / k;
            m.z += (p.z - m.z) / k;
        }
        Some(m)
    }

    /// Translate by the given offsets.
    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Point3D {
        Point3D::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl From<[f64; 3]> for Point3D {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Point3D> for [f64; 3] {
    fn from(p: Point3D) -> Self {
        [p.x, p.y, p.z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_2d_ignores_depth() {
        let a = Point3D::new(0.0, 0.0, 5.0);
        let b = Point3D::new(3.0, 4.0, -2.0);
        assert!((a.distance_2d(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_3d() {
        let a = Point3D::new(0.0, 0.0, 0.0);
        let b = Point3D::new(1.0, 2.0, 2.0);
        assert!((a.distance_3d(&b) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_mean() {
        let points = [Point3D::new(0.0, 0.0, 0.0), Point3D::new(1.0, 0.5, -1.0)];
        let mean = Point3D::mean(&points).unwrap();
        assert_eq!(mean, Point3D::new(0.5, 0.25, -0.5));
        assert!(Point3D::mean(&[]).is_none());
    }

    #[test]
    fn test_mean_of_identical_points_is_exact() {
        let p = Point3D::new(0.42, 0.51, -0.03);
        for n in [1, 7, 30, 60, 301] {
            assert_eq!(Point3D::mean(&vec![p; n]), Some(p));
        }
    }

    #[test]
    fn test_serializes_as_array() {
        let json = serde_json::to_string(&Point3D::new(0.5, 0.25, 0.0)).unwrap();
        assert_eq!(json, "[0.5,0.25,0.0]");
        let parsed: Point3D = serde_json::from_str("[0.1,0.2,0.3]").unwrap();
        assert_eq!(parsed, Point3D::new(0.1, 0.2, 0.3));
    }
}
