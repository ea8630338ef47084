//! JSONL frame recorder.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use attentive_common::error::AttentiveResult;
use attentive_model::{header_line, FrameStreamHeader, LandmarkFrame};

/// Writes landmark frames to a JSONL file, header first.
pub struct FrameWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    frames_written: u64,
}

impl FrameWriter {
    /// Create (or truncate) `path` and write the header as a `#` comment line.
    pub fn create(path: impl AsRef<Path>, header: &FrameStreamHeader) -> AttentiveResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "{}", header_line(header)?)?;

        Ok(Self {
            writer,
            path,
            frames_written: 0,
        })
    }

    pub fn write_frame(&mut self, frame: &LandmarkFrame) -> AttentiveResult<()> {
        let json = serde_json::to_string(frame)?;
        writeln!(self.writer, "{json}")?;
        self.frames_written += 1;

        if self.frames_written % 500 == 0 {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> AttentiveResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FrameWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
