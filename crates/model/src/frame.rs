//! Landmark frames produced by the upstream landmark detector.
//!
//! Recorded streams use JSONL: an optional `#`-prefixed header line followed
//! by one frame per line, e.g.
//! `{"t":33333333,"type":"face","points":[[0.5,0.5,0.0],...]}` or
//! `{"t":66666666,"type":"no_face"}`.

use serde::{Deserialize, Serialize};

use crate::point::Point3D;

/// Monotonic timestamp in nanoseconds since stream start.
pub type TimestampNs = u64;

/// One detector output: a timestamp plus landmarks, or nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Monotonic nanoseconds since stream start.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    /// The frame payload.
    #[serde(flatten)]
    pub kind: FrameKind,
}

/// Whether the detector found a face in the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrameKind {
    /// Landmarks indexed by the producer's stable numbering.
    Face { points: Vec<Point3D> },

    /// Detection failed for this frame.
    NoFace,
}

/// Metadata written as the first (comment) line of a frame stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameStreamHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Nominal source frame rate.
    pub fps: f64,

    /// Number of landmarks per face frame.
    pub landmark_count: usize,

    /// Free-form producer name (e.g. "face_mesh", "synthetic").
    pub source: String,

    /// Wall-clock time at stream start (RFC 3339), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
}

impl LandmarkFrame {
    /// Create a frame containing a detected face.
    pub fn face(timestamp_ns: TimestampNs, points: Vec<Point3D>) -> Self {
        Self {
            timestamp_ns,
            kind: FrameKind::Face { points },
        }
    }

    /// Create a frame where no face was detected.
    pub fn no_face(timestamp_ns: TimestampNs) -> Self {
        Self {
            timestamp_ns,
            kind: FrameKind::NoFace,
        }
    }

    /// Timestamp as fractional seconds since stream start.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_ns as f64 / 1_000_000_000.0
    }

    /// Landmarks, if a face was detected.
    pub fn landmarks(&self) -> Option<&[Point3D]> {
        match &self.kind {
            FrameKind::Face { points } => Some(points),
            FrameKind::NoFace => None,
        }
    }

    /// Landmark at a stable index, if present.
    pub fn point(&self, index: usize) -> Option<Point3D> {
        self.landmarks().and_then(|points| points.get(index).copied())
    }

    pub fn has_face(&self) -> bool {
        matches!(self.kind, FrameKind::Face { .. })
    }
}

impl FrameStreamHeader {
    pub fn new(source: impl Into<String>, fps: f64, landmark_count: usize) -> Self {
        Self {
            schema_version: "1.0".to_string(),
            fps,
            landmark_count,
            source: source.into(),
            started_at: None,
        }
    }
}

/// Format a header as the leading `#` comment line of a stream (no newline).
pub fn header_line(header: &FrameStreamHeader) -> Result<String, serde_json::Error> {
    Ok(format!("# {}", serde_json::to_string(header)?))
}

/// Parse a `#` header line. Returns `None` when the line is not a comment.
pub fn parse_header_line(line: &str) -> Option<Result<FrameStreamHeader, serde_json::Error>> {
    let raw = line.trim().strip_prefix('#')?;
    Some(serde_json::from_str(raw.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_format() {
        let frame = LandmarkFrame::face(1_000, vec![Point3D::new(0.5, 0.25, 0.0)]);
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"t\":1000"));
        assert!(json.contains("\"type\":\"face\""));
        assert!(json.contains("\"points\":[[0.5,0.25,0.0]]"));

        let json = serde_json::to_string(&LandmarkFrame::no_face(7)).unwrap();
        assert_eq!(json, r#"{"t":7,"type":"no_face"}"#);
    }

    #[test]
    fn test_header_line_round_trip() {
        let header = FrameStreamHeader::new("synthetic", 30.0, 468);
        let line = header_line(&header).unwrap();
        assert!(line.starts_with("# {"));
        assert!(!line.contains('\n'));
        assert_eq!(parse_header_line(&line).unwrap().unwrap(), header);
    }

    #[test]
    fn test_frame_line_is_not_a_header() {
        assert!(parse_header_line(r#"{"t":0,"type":"no_face"}"#).is_none());
        assert!(parse_header_line("# not json").unwrap().is_err());
    }

    #[test]
    fn test_point_lookup() {
        let frame = LandmarkFrame::face(0, vec![Point3D::default(), Point3D::new(1.0, 0.0, 0.0)]);
        assert_eq!(frame.point(1), Some(Point3D::new(1.0, 0.0, 0.0)));
        assert_eq!(frame.point(2), None);
        assert_eq!(LandmarkFrame::no_face(0).point(0), None);
    }

    #[test]
    fn test_timestamp_secs() {
        let frame = LandmarkFrame::no_face(1_500_000_000);
        assert!((frame.timestamp_secs() - 1.5).abs() < 1e-9);
    }
}
