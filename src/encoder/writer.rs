//! Local codec writer backend.
//!
//! Probes a fixed, ordered codec list once at open; the first writer that
//! reports open is retained. If none opens, a baseline MJPG/AVI writer
//! guarantees the session can still record at degraded quality.

use std::path::{Path, PathBuf};

use opencv::core::{Mat, Size};
use opencv::prelude::*;
use opencv::videoio::VideoWriter;

use crate::error::EncoderError;

/// Probe order: best quality first. All target an mp4 container.
const CODEC_PROBE: [&str; 3] = ["avc1", "H264", "mp4v"];

/// Universally available fallback.
const BASELINE_CODEC: &str = "MJPG";
const BASELINE_EXT: &str = "avi";

pub struct CodecWriter {
    writer: VideoWriter,
    path: PathBuf,
    codec: &'static str,
}

fn fourcc(code: &str) -> Result<i32, EncoderError> {
    let b = code.as_bytes();
    Ok(VideoWriter::fourcc(
        b[0] as char,
        b[1] as char,
        b[2] as char,
        b[3] as char,
    )?)
}

impl CodecWriter {
    pub fn open(
        dir: &Path,
        stem: &str,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Self, EncoderError> {
        let size = Size::new(width as i32, height as i32);

        for codec in CODEC_PROBE {
            let path = dir.join(format!("{stem}.mp4"));
            let path_str = path.to_string_lossy();
            let mut writer = VideoWriter::new(&path_str, fourcc(codec)?, fps as f64, size, true)?;
            if writer.is_opened()? {
                return Ok(Self {
                    writer,
                    path,
                    codec,
                });
            }
            let _ = writer.release();
            tracing::debug!("codec {codec} not available for {path_str}");
        }

        let path = dir.join(format!("{stem}.{BASELINE_EXT}"));
        let path_str = path.to_string_lossy();
        let mut writer = VideoWriter::new(&path_str, fourcc(BASELINE_CODEC)?, fps as f64, size, true)?;
        if writer.is_opened()? {
            tracing::warn!("falling back to baseline {BASELINE_CODEC} writer for {path_str}");
            return Ok(Self {
                writer,
                path,
                codec: BASELINE_CODEC,
            });
        }
        let _ = writer.release();

        let mut tried = CODEC_PROBE.to_vec();
        tried.push(BASELINE_CODEC);
        Err(EncoderError::CodecUnavailable { tried })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn codec(&self) -> &'static str {
        self.codec
    }

    pub fn write_frame(&mut self, frame: &Mat) -> Result<(), EncoderError> {
        self.writer.write(frame).map_err(|e| EncoderError::Write {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    pub fn finish(&mut self) -> Result<(), EncoderError> {
        self.writer.release().map_err(|e| EncoderError::Close {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_order_quality_first() {
        assert_eq!(CODEC_PROBE[0], "avc1");
        assert_eq!(CODEC_PROBE[CODEC_PROBE.len() - 1], "mp4v");
        assert!(!CODEC_PROBE.contains(&BASELINE_CODEC));
    }

    #[test]
    fn test_fourcc_round_trip() {
        // mp4v fourcc must match the char-wise constructor
        let expected = VideoWriter::fourcc('m', 'p', '4', 'v').unwrap();
        assert_eq!(fourcc("mp4v").unwrap(), expected);
    }
}
