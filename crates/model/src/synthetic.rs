//! Synthetic landmark generation for tests and demos.
//!
//! Builds geometrically exact faces so that scores are predictable: the eye
//! points are placed so the eye-aspect-ratio equals the requested value, the
//! lateral anchors sit exactly `lateral_separation` apart, and so on.

use std::str::FromStr;

use crate::frame::LandmarkFrame;
use crate::layout::LandmarkLayout;
use crate::point::Point3D;

/// Parameters of one synthetic face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticFace {
    /// Nose tip position.
    pub nose: Point3D,
    /// Horizontal distance between the lateral (ear) anchors.
    pub lateral_separation: f64,
    /// Eye-aspect-ratio of both eyes.
    pub eye_aspect_ratio: f64,
    /// Horizontal eye span (corner to corner).
    pub eye_width: f64,
    /// Vertical position of both eyebrow anchors.
    pub eyebrow_y: f64,
    /// Distance between the mouth corners.
    pub mouth_width: f64,
}

impl Default for SyntheticFace {
    /// A relaxed face looking straight at the camera, matching the
    /// default expression targets.
    fn default() -> Self {
        Self {
            nose: Point3D::new(0.5, 0.5, -0.05),
            lateral_separation: 0.2,
            eye_aspect_ratio: 0.3,
            eye_width: 0.06,
            eyebrow_y: 0.35,
            mouth_width: 0.4,
        }
    }
}

impl SyntheticFace {
    /// Same face with the eyes closed.
    pub fn blinking(self) -> Self {
        Self {
            eye_aspect_ratio: 0.1,
            ..self
        }
    }

    /// Same face with the head turned far enough to collapse the lateral anchors.
    pub fn turned_away(self) -> Self {
        Self {
            lateral_separation: 0.04,
            ..self
        }
    }

    /// Same face with the nose moved by the given offsets.
    pub fn shifted(self, dx: f64, dy: f64) -> Self {
        Self {
            nose: self.nose.offset(dx, dy, 0.0),
            ..self
        }
    }

    /// Landmarks for this face under `layout`.
    ///
    /// Points the layout does not reference are parked on the nose tip.
    pub fn points(&self, layout: &LandmarkLayout) -> Vec<Point3D> {
        let count = layout.required_len().max(LandmarkLayout::FACE_MESH_POINTS);
        let mut points = vec![self.nose; count];

        let (cx, cy) = (self.nose.x, self.nose.y);
        let half_sep = self.lateral_separation / 2.0;
        points[layout.left_lateral] = Point3D::planar(cx - half_sep, cy);
        points[layout.right_lateral] = Point3D::planar(cx + half_sep, cy);

        let eye_y = cy - 0.08;
        for (indices, eye_x) in [(&layout.left_eye, cx - 0.06), (&layout.right_eye, cx + 0.06)] {
            for (index, point) in indices.iter().zip(self.eye_points(eye_x, eye_y)) {
                points[*index] = point;
            }
        }

        points[layout.left_eyebrow] = Point3D::planar(cx - 0.06, self.eyebrow_y);
        points[layout.right_eyebrow] = Point3D::planar(cx + 0.06, self.eyebrow_y);

        let half_mouth = self.mouth_width / 2.0;
        points[layout.mouth_left] = Point3D::planar(cx - half_mouth, cy + 0.1);
        points[layout.mouth_right] = Point3D::planar(cx + half_mouth, cy + 0.1);

        points[layout.nose_tip] = self.nose;
        points
    }

    /// Frame at `timestamp_ns` containing this face.
    pub fn frame(&self, timestamp_ns: u64, layout: &LandmarkLayout) -> LandmarkFrame {
        LandmarkFrame::face(timestamp_ns, self.points(layout))
    }

    /// Six eye points whose aspect ratio is exactly `eye_aspect_ratio`.
    fn eye_points(&self, cx: f64, cy: f64) -> [Point3D; 6] {
        let w = self.eye_width;
        let h = self.eye_aspect_ratio * w;
        let (left, right) = (cx - w / 2.0, cx + w / 2.0);
        let (inner_l, inner_r) = (cx - w / 6.0, cx + w / 6.0);
        let (top, bottom) = (cy - h / 2.0, cy + h / 2.0);
        [
            Point3D::planar(left, cy),
            Point3D::planar(inner_l, top),
            Point3D::planar(inner_r, top),
            Point3D::planar(right, cy),
            Point3D::planar(inner_r, bottom),
            Point3D::planar(inner_l, bottom),
        ]
    }
}

/// Canned behaviour scripts for generated streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticPattern {
    /// Steady gaze with a natural blink cadence.
    Focused,
    /// Frequent head turns, drifting position and dropped detections.
    Distracted,
    /// Focused first half, then periodic look-aways and detection gaps.
    Mixed,
}

impl FromStr for SyntheticPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focused" => Ok(Self::Focused),
            "distracted" => Ok(Self::Distracted),
            "mixed" => Ok(Self::Mixed),
            other => Err(format!(
                "unknown pattern '{other}' (expected focused|distracted|mixed)"
            )),
        }
    }
}

/// Generate `count` frames at `fps` following `pattern`.
pub fn generate_frames(
    pattern: SyntheticPattern,
    count: usize,
    fps: f64,
    layout: &LandmarkLayout,
) -> Vec<LandmarkFrame> {
    let base = SyntheticFace::default();
    let interval_ns = (1_000_000_000.0 / fps) as u64;

    (0..count)
        .map(|i| {
            let t = i as u64 * interval_ns;
            let focused = || {
                // ~17.5 blink frames per minute at 30 fps
                if i % 103 == 50 {
                    base.blinking()
                } else {
                    base
                }
            };

            let face = match pattern {
                SyntheticPattern::Focused => Some(focused()),
                SyntheticPattern::Distracted => {
                    if i % 7 == 3 {
                        None
                    } else if (i / 15) % 2 == 0 {
                        Some(base.turned_away().shifted(0.12, 0.0))
                    } else {
                        Some(base.shifted(-0.15, 0.05))
                    }
                }
                SyntheticPattern::Mixed => {
                    if i < count / 2 {
                        Some(focused())
                    } else {
                        match i % 90 {
                            0..=29 => Some(base.turned_away().shifted(0.1, 0.0)),
                            30..=39 => None,
                            _ => Some(focused()),
                        }
                    }
                }
            };

            match face {
                Some(face) => face.frame(t, layout),
                None => LandmarkFrame::no_face(t),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ear(eye: &[Point3D; 6]) -> f64 {
        (eye[1].distance_2d(&eye[5]) + eye[2].distance_2d(&eye[4]))
            / (2.0 * eye[0].distance_2d(&eye[3]))
    }

    #[test]
    fn test_eye_points_hit_requested_ratio() {
        let layout = LandmarkLayout::FACE_MESH;
        let face = SyntheticFace {
            eye_aspect_ratio: 0.25,
            ..Default::default()
        };
        let geometry = layout.extract(&face.frame(0, &layout)).unwrap();
        assert!((ear(&geometry.left_eye) - 0.25).abs() < 1e-9);
        assert!((ear(&geometry.right_eye) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_turned_away_collapses_lateral_anchors() {
        let layout = LandmarkLayout::FACE_MESH;
        let geometry = layout
            .extract(&SyntheticFace::default().turned_away().frame(0, &layout))
            .unwrap();
        let separation = (geometry.left_lateral.x - geometry.right_lateral.x).abs();
        assert!((separation - 0.04).abs() < 1e-9);
    }

    #[test]
    fn test_generate_frames_timestamps() {
        let frames = generate_frames(
            SyntheticPattern::Focused,
            4,
            10.0,
            &LandmarkLayout::FACE_MESH,
        );
        let stamps: Vec<u64> = frames.iter().map(|f| f.timestamp_ns).collect();
        assert_eq!(stamps, vec![0, 100_000_000, 200_000_000, 300_000_000]);
        assert!(frames.iter().all(LandmarkFrame::has_face));
    }

    #[test]
    fn test_distracted_pattern_drops_detections() {
        let frames = generate_frames(
            SyntheticPattern::Distracted,
            30,
            30.0,
            &LandmarkLayout::FACE_MESH,
        );
        assert!(frames.iter().any(|f| !f.has_face()));
    }

    #[test]
    fn test_pattern_parsing() {
        assert_eq!(
            "Mixed".parse::<SyntheticPattern>().unwrap(),
            SyntheticPattern::Mixed
        );
        assert!("sleepy".parse::<SyntheticPattern>().is_err());
    }
}
