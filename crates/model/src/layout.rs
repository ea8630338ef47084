//! Landmark layout: the handful of indices the pipeline depends on.
//!
//! Any landmark producer that exposes these points by stable index can be
//! plugged in; the default matches the 468-point face mesh.

use serde::{Deserialize, Serialize};

use crate::frame::LandmarkFrame;
use crate::point::Point3D;

/// Indices of the landmarks read by the analyzers.
///
/// Eye indices are ordered `p1..p6`: outer corner, two upper-lid points,
/// inner corner, two lower-lid points (so `p2`/`p6` and `p3`/`p5` are
/// vertical pairs and `p1`/`p4` is the horizontal span).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkLayout {
    pub nose_tip: usize,
    pub left_lateral: usize,
    pub right_lateral: usize,
    pub left_eye: [usize; 6],
    pub right_eye: [usize; 6],
    pub left_eyebrow: usize,
    pub right_eyebrow: usize,
    pub mouth_left: usize,
    pub mouth_right: usize,
}

impl LandmarkLayout {
    /// The 468-point face mesh numbering.
    pub const FACE_MESH: LandmarkLayout = LandmarkLayout {
        nose_tip: 1,
        left_lateral: 234,
        right_lateral: 454,
        left_eye: [33, 160, 158, 133, 153, 144],
        right_eye: [362, 385, 387, 263, 373, 380],
        left_eyebrow: 65,
        right_eyebrow: 295,
        mouth_left: 61,
        mouth_right: 291,
    };

    /// Face mesh landmark count.
    pub const FACE_MESH_POINTS: usize = 468;

    /// Every index this layout reads.
    pub fn indices(&self) -> Vec<usize> {
        let mut indices = vec![
            self.nose_tip,
            self.left_lateral,
            self.right_lateral,
            self.left_eyebrow,
            self.right_eyebrow,
            self.mouth_left,
            self.mouth_right,
        ];
        indices.extend_from_slice(&self.left_eye);
        indices.extend_from_slice(&self.right_eye);
        indices
    }

    /// Minimum landmark count a frame needs for this layout.
    pub fn required_len(&self) -> usize {
        self.indices().into_iter().max().map_or(0, |max| max + 1)
    }

    /// Indices this layout needs that the frame does not provide.
    pub fn missing_indices(&self, frame: &LandmarkFrame) -> Vec<usize> {
        let len = frame.landmarks().map_or(0, <[Point3D]>::len);
        let mut missing: Vec<usize> = self.indices().into_iter().filter(|i| *i >= len).collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }

    /// Resolve the layout against a frame.
    ///
    /// Returns `None` when the frame has no face or lacks any required index;
    /// callers treat both the same way (signal absence).
    pub fn extract(&self, frame: &LandmarkFrame) -> Option<FaceGeometry> {
        let points = frame.landmarks()?;
        let at = |i: usize| points.get(i).copied();
        let eye = |idx: &[usize; 6]| -> Option<[Point3D; 6]> {
            Some([
                at(idx[0])?,
                at(idx[1])?,
                at(idx[2])?,
                at(idx[3])?,
                at(idx[4])?,
                at(idx[5])?,
            ])
        };

        Some(FaceGeometry {
            nose_tip: at(self.nose_tip)?,
            left_lateral: at(self.left_lateral)?,
            right_lateral: at(self.right_lateral)?,
            left_eye: eye(&self.left_eye)?,
            right_eye: eye(&self.right_eye)?,
            left_eyebrow: at(self.left_eyebrow)?,
            right_eyebrow: at(self.right_eyebrow)?,
            mouth_left: at(self.mouth_left)?,
            mouth_right: at(self.mouth_right)?,
        })
    }
}

impl Default for LandmarkLayout {
    fn default() -> Self {
        Self::FACE_MESH
    }
}

/// The subset of a face the analyzers consume, resolved from one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceGeometry {
    pub nose_tip: Point3D,
    pub left_lateral: Point3D,
    pub right_lateral: Point3D,
    pub left_eye: [Point3D; 6],
    pub right_eye: [Point3D; 6],
    pub left_eyebrow: Point3D,
    pub right_eyebrow: Point3D,
    pub mouth_left: Point3D,
    pub mouth_right: Point3D,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_mesh_required_len() {
        assert_eq!(LandmarkLayout::FACE_MESH.required_len(), 455);
        assert!(LandmarkLayout::FACE_MESH.required_len() <= LandmarkLayout::FACE_MESH_POINTS);
    }

    #[test]
    fn test_extract_reads_configured_indices() {
        let layout = LandmarkLayout::FACE_MESH;
        let mut points = vec![Point3D::default(); LandmarkLayout::FACE_MESH_POINTS];
        points[1] = Point3D::new(0.5, 0.5, -0.1);
        points[234] = Point3D::planar(0.4, 0.5);
        points[454] = Point3D::planar(0.6, 0.5);
        let frame = LandmarkFrame::face(0, points);

        let geometry = layout.extract(&frame).unwrap();
        assert_eq!(geometry.nose_tip, Point3D::new(0.5, 0.5, -0.1));
        assert_eq!(geometry.left_lateral.x, 0.4);
        assert_eq!(geometry.right_lateral.x, 0.6);
    }

    #[test]
    fn test_extract_short_frame_is_absent() {
        let layout = LandmarkLayout::FACE_MESH;
        let frame = LandmarkFrame::face(0, vec![Point3D::default(); 100]);
        assert!(layout.extract(&frame).is_none());

        let missing = layout.missing_indices(&frame);
        assert!(missing.contains(&234));
        assert!(missing.contains(&454));
        assert!(!missing.contains(&1));
    }

    #[test]
    fn test_extract_no_face() {
        assert!(LandmarkLayout::default()
            .extract(&LandmarkFrame::no_face(0))
            .is_none());
    }
}
