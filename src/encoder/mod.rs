//! Per-variant output video streams.
//!
//! A `StreamEncoder` owns exactly one output destination: either a piped
//! external `ffmpeg` process (preferred, configurable quality) or a local
//! `VideoWriter` resolved through a fixed codec probe (fallback). Never
//! shared across sessions; flushed and closed at session close.

pub mod pipe;
pub mod writer;

use std::path::{Path, PathBuf};

use opencv::core::Mat;

use crate::config::EncoderConfig;
use crate::error::EncoderError;
use crate::session::Variant;

enum Backend {
    Pipe(pipe::FfmpegPipe),
    Writer(writer::CodecWriter),
}

pub struct StreamEncoder {
    variant: Variant,
    path: PathBuf,
    backend: Backend,
    frames_written: u64,
    /// true when the preferred pipe backend was unavailable
    degraded: bool,
    closed: bool,
}

/// `{base}_{variant}_{width}x{height}_{fps}fps_{timestamp}` — extension is
/// appended by the backend that actually opens the file.
fn file_stem(base: &str, variant: Variant, width: u32, height: u32, fps: u32, ts: &str) -> String {
    format!("{base}_{}_{width}x{height}_{fps}fps_{ts}", variant.label())
}

impl StreamEncoder {
    /// Opens the stream for one variant, resolving the backend once.
    ///
    /// A pipe spawn failure is recorded and degrades to the codec writer;
    /// only the failure of every backend is an error.
    pub fn open(
        config: &EncoderConfig,
        dir: &Path,
        base: &str,
        variant: Variant,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Self, EncoderError> {
        let ts = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let stem = file_stem(base, variant, width, height, fps, &ts);

        let mut degraded = false;
        if config.prefer_pipe {
            let path = dir.join(format!("{stem}.mp4"));
            match pipe::FfmpegPipe::spawn(config, &path, width, height, fps) {
                Ok(pipe) => {
                    tracing::info!(
                        "encoder[{}]: ffmpeg pipe -> {}",
                        variant.label(),
                        path.display()
                    );
                    return Ok(Self {
                        variant,
                        path,
                        backend: Backend::Pipe(pipe),
                        frames_written: 0,
                        degraded: false,
                        closed: false,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        "encoder[{}]: pipe backend unavailable ({e}), falling back to codec writer",
                        variant.label()
                    );
                    degraded = true;
                }
            }
        }

        let writer = writer::CodecWriter::open(dir, &stem, width, height, fps)?;
        let path = writer.path().to_path_buf();
        tracing::info!(
            "encoder[{}]: codec writer ({}) -> {}",
            variant.label(),
            writer.codec(),
            path.display()
        );
        Ok(Self {
            variant,
            path,
            backend: Backend::Writer(writer),
            frames_written: 0,
            degraded,
            closed: false,
        })
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Appends one BGR frame. Frames are written in call order.
    pub fn append(&mut self, frame: &Mat) -> Result<(), EncoderError> {
        if self.closed {
            return Err(EncoderError::Write {
                path: self.path.clone(),
                reason: "encoder already closed".to_string(),
            });
        }
        match &mut self.backend {
            Backend::Pipe(pipe) => pipe.write_frame(frame, &self.path)?,
            Backend::Writer(writer) => writer.write_frame(frame)?,
        }
        self.frames_written += 1;
        Ok(())
    }

    /// Flushes and releases the stream. Idempotent.
    pub fn close(&mut self) -> Result<(), EncoderError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match &mut self.backend {
            Backend::Pipe(pipe) => pipe.finish(&self.path),
            Backend::Writer(writer) => writer.finish(),
        }
    }
}

impl Drop for StreamEncoder {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            match &mut self.backend {
                Backend::Pipe(pipe) => pipe.abort(),
                Backend::Writer(writer) => {
                    let _ = writer.finish();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_pattern() {
        let stem = file_stem("capture", Variant::Clinical, 1280, 720, 30, "20260807_101500");
        assert_eq!(stem, "capture_clinical_1280x720_30fps_20260807_101500");
    }

    #[test]
    fn test_file_stem_distinct_per_variant() {
        let raw = file_stem("s", Variant::Raw, 640, 480, 25, "t");
        let skeleton = file_stem("s", Variant::Skeleton, 640, 480, 25, "t");
        assert_ne!(raw, skeleton);
    }
}
