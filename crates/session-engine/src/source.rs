//! Landmark sources.
//!
//! A source yields frames in timestamp order until it is exhausted. Sources
//! hold upstream resources (files, devices, models) and must let go of them
//! in [`LandmarkSource::release`].

use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use attentive_common::error::{AttentiveError, AttentiveResult};
use attentive_model::synthetic::{generate_frames, SyntheticPattern};
use attentive_model::{parse_header_line, FrameStreamHeader, LandmarkFrame, LandmarkLayout};

/// Trait for landmark producers.
pub trait LandmarkSource: Send {
    /// Next frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> AttentiveResult<Option<LandmarkFrame>>;

    /// Source name for logging.
    fn name(&self) -> &str;

    /// Release upstream resources. Called once, before the worker exits.
    fn release(&mut self) -> AttentiveResult<()> {
        Ok(())
    }

    /// A handle that can release the source from another thread while a
    /// read is in progress. Sources without one are only released by
    /// their owner.
    fn release_handle(&self) -> Option<ReleaseHandle> {
        None
    }
}

/// Forces a source to let go of its upstream resources from outside the
/// thread that owns it. Releasing twice is harmless.
#[derive(Clone)]
pub struct ReleaseHandle {
    release: Arc<dyn Fn() + Send + Sync>,
}

impl ReleaseHandle {
    pub fn new(release: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            release: Arc::new(release),
        }
    }

    pub fn release(&self) {
        (self.release)();
    }
}

impl fmt::Debug for ReleaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseHandle").finish_non_exhaustive()
    }
}

type SharedReader = Arc<Mutex<Option<BufReader<File>>>>;

/// Frames read from a recorded JSONL stream.
///
/// Malformed lines (bad JSON or invalid UTF-8) are skipped with a warning;
/// read failures are upstream errors.
pub struct JsonlFrameSource {
    reader: SharedReader,
    path: PathBuf,
    name: String,
    header: Option<FrameStreamHeader>,
    pending: Option<String>,
    buf: Vec<u8>,
    line_no: u64,
    frames_read: u64,
    lines_skipped: u64,
}

impl JsonlFrameSource {
    /// Open a frame file and read its header, if it has one.
    pub fn open(path: impl AsRef<Path>) -> AttentiveResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(AttentiveError::FileNotFound { path });
        }
        let file = File::open(&path).map_err(|e| {
            AttentiveError::source(format!("Failed to open {}: {e}", path.display()))
        })?;

        let mut source = Self {
            reader: Arc::new(Mutex::new(Some(BufReader::new(file)))),
            name: format!("jsonl:{}", path.display()),
            path,
            header: None,
            pending: None,
            buf: Vec::new(),
            line_no: 0,
            frames_read: 0,
            lines_skipped: 0,
        };
        source.read_header()?;
        Ok(source)
    }

    /// Stream header, when the file starts with one.
    pub fn header(&self) -> Option<&FrameStreamHeader> {
        self.header.as_ref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Malformed lines skipped so far.
    pub fn lines_skipped(&self) -> u64 {
        self.lines_skipped
    }

    fn read_header(&mut self) -> AttentiveResult<()> {
        while let Some(line) = self.read_line()? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match parse_header_line(trimmed) {
                Some(Ok(header)) => self.header = Some(header),
                Some(Err(e)) => tracing::warn!(error = %e, "Ignoring unreadable stream header"),
                None => self.pending = Some(trimmed.to_string()),
            }
            break;
        }
        Ok(())
    }

    fn released_error(&self) -> AttentiveError {
        AttentiveError::source(format!("{} has been released", self.name))
    }

    fn is_released(&self) -> bool {
        self.reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Next line that is valid UTF-8, or `None` at end of file.
    fn read_line(&mut self) -> AttentiveResult<Option<String>> {
        loop {
            self.buf.clear();
            let read = {
                let mut guard = self.reader.lock().unwrap_or_else(PoisonError::into_inner);
                let Some(reader) = guard.as_mut() else {
                    return Err(self.released_error());
                };
                reader.read_until(b'\n', &mut self.buf).map_err(|e| {
                    AttentiveError::source(format!("Failed to read {}: {e}", self.path.display()))
                })?
            };
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            match std::str::from_utf8(&self.buf) {
                Ok(line) => return Ok(Some(line.to_string())),
                Err(e) => {
                    self.lines_skipped += 1;
                    tracing::warn!(line = self.line_no, error = %e, "Skipping non UTF-8 line");
                }
            }
        }
    }

    fn parse(&mut self, line: &str) -> Option<LandmarkFrame> {
        match serde_json::from_str::<LandmarkFrame>(line) {
            Ok(frame) => {
                self.frames_read += 1;
                Some(frame)
            }
            Err(e) => {
                self.lines_skipped += 1;
                tracing::warn!(line = self.line_no, error = %e, "Skipping malformed frame");
                None
            }
        }
    }
}

impl LandmarkSource for JsonlFrameSource {
    fn next_frame(&mut self) -> AttentiveResult<Option<LandmarkFrame>> {
        if self.is_released() {
            return Err(self.released_error());
        }
        if let Some(line) = self.pending.take() {
            if let Some(frame) = self.parse(&line) {
                return Ok(Some(frame));
            }
        }

        while let Some(line) = self.read_line()? {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Some(frame) = self.parse(trimmed) {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn release(&mut self) -> AttentiveResult<()> {
        self.pending = None;
        let closed = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if closed.is_some() {
            tracing::debug!(
                source = %self.name,
                frames = self.frames_read,
                skipped = self.lines_skipped,
                "Frame file closed"
            );
        }
        Ok(())
    }

    fn release_handle(&self) -> Option<ReleaseHandle> {
        let reader = self.reader.clone();
        Some(ReleaseHandle::new(move || {
            reader.lock().unwrap_or_else(PoisonError::into_inner).take();
        }))
    }
}

/// Frames replayed from memory.
pub struct ReplaySource {
    frames: VecDeque<LandmarkFrame>,
    name: String,
}

impl ReplaySource {
    pub fn new(name: impl Into<String>, frames: Vec<LandmarkFrame>) -> Self {
        Self {
            frames: frames.into(),
            name: name.into(),
        }
    }

    /// A generated stream following `pattern`.
    pub fn synthetic(
        pattern: SyntheticPattern,
        count: usize,
        fps: f64,
        layout: &LandmarkLayout,
    ) -> Self {
        Self::new(
            format!("synthetic:{pattern:?}").to_lowercase(),
            generate_frames(pattern, count, fps, layout),
        )
    }

    /// Frames not yet handed out.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl LandmarkSource for ReplaySource {
    fn next_frame(&mut self) -> AttentiveResult<Option<LandmarkFrame>> {
        Ok(self.frames.pop_front())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn release(&mut self) -> AttentiveResult<()> {
        self.frames.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::FrameWriter;
    use attentive_model::Point3D;

    fn temp_file(name: &str, content: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join("attentive_test_source");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file() {
        let result = JsonlFrameSource::open("/nonexistent/frames.jsonl");
        assert!(matches!(result, Err(AttentiveError::FileNotFound { .. })));
    }

    #[test]
    fn test_reads_header_and_frames() {
        let dir = std::env::temp_dir().join("attentive_test_source");
        let path = dir.join("with_header.jsonl");
        let header = FrameStreamHeader::new("test", 30.0, 2);
        let frames = vec![
            LandmarkFrame::face(0, vec![Point3D::new(0.5, 0.25, 0.0); 2]),
            LandmarkFrame::no_face(33_333_333),
        ];
        {
            let mut writer = FrameWriter::create(&path, &header).unwrap();
            for frame in &frames {
                writer.write_frame(frame).unwrap();
            }
        }

        let mut source = JsonlFrameSource::open(&path).unwrap();
        assert_eq!(source.header(), Some(&header));
        assert_eq!(source.next_frame().unwrap(), Some(frames[0].clone()));
        assert_eq!(source.next_frame().unwrap(), Some(frames[1].clone()));
        assert_eq!(source.next_frame().unwrap(), None);
        assert_eq!(source.frames_read(), 2);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_headerless_file_keeps_first_frame() {
        let path = temp_file(
            "headerless.jsonl",
            b"{\"t\":0,\"type\":\"no_face\"}\n{\"t\":5,\"type\":\"no_face\"}\n",
        );
        let mut source = JsonlFrameSource::open(&path).unwrap();
        assert!(source.header().is_none());
        assert_eq!(source.next_frame().unwrap().unwrap().timestamp_ns, 0);
        assert_eq!(source.next_frame().unwrap().unwrap().timestamp_ns, 5);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let path = temp_file(
            "malformed.jsonl",
            b"{\"t\":0,\"type\":\"no_face\"}\nnot json\n\n{\"t\":9,\"type\":\"no_face\"}\n",
        );
        let mut source = JsonlFrameSource::open(&path).unwrap();
        assert_eq!(source.next_frame().unwrap().unwrap().timestamp_ns, 0);
        assert_eq!(source.next_frame().unwrap().unwrap().timestamp_ns, 9);
        assert_eq!(source.lines_skipped(), 1);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let path = temp_file(
            "binary.jsonl",
            b"{\"t\":0,\"type\":\"no_face\"}\n\xff\xfe garbage\n{\"t\":9,\"type\":\"no_face\"}\n",
        );
        let mut source = JsonlFrameSource::open(&path).unwrap();
        assert_eq!(source.next_frame().unwrap().unwrap().timestamp_ns, 0);
        assert_eq!(source.next_frame().unwrap().unwrap().timestamp_ns, 9);
        assert_eq!(source.next_frame().unwrap(), None);
        assert_eq!(source.lines_skipped(), 1);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_released_source_errors() {
        // Headerless, so the first frame is already buffered when released.
        let path = temp_file("released.jsonl", b"{\"t\":0,\"type\":\"no_face\"}\n");
        let mut source = JsonlFrameSource::open(&path).unwrap();
        source.release().unwrap();
        assert!(matches!(
            source.next_frame(),
            Err(AttentiveError::Source { .. })
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_release_handle_closes_reader() {
        let path = temp_file(
            "handle.jsonl",
            b"{\"t\":0,\"type\":\"no_face\"}\n{\"t\":5,\"type\":\"no_face\"}\n",
        );
        let mut source = JsonlFrameSource::open(&path).unwrap();
        let handle = source.release_handle().unwrap();
        assert_eq!(source.next_frame().unwrap().unwrap().timestamp_ns, 0);

        std::thread::spawn(move || handle.release()).join().unwrap();
        assert!(matches!(
            source.next_frame(),
            Err(AttentiveError::Source { .. })
        ));
        // The owner's own release afterwards is still fine.
        source.release().unwrap();
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_replay_source_drains() {
        let layout = LandmarkLayout::FACE_MESH;
        let mut source = ReplaySource::synthetic(SyntheticPattern::Focused, 3, 30.0, &layout);
        assert_eq!(source.name(), "synthetic:focused");
        assert_eq!(source.remaining(), 3);
        assert!(source.release_handle().is_none());
        while source.next_frame().unwrap().is_some() {}
        assert_eq!(source.remaining(), 0);
    }
}
