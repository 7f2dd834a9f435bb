//! Piped external encoder backend.
//!
//! Spawns a long-lived `ffmpeg` process reading raw BGR24 frames on stdin
//! and writing the finished container on normal termination.

use std::io::Write;
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::time::{Duration, Instant};

use opencv::core::Mat;
use opencv::prelude::*;

use crate::config::EncoderConfig;
use crate::error::EncoderError;

pub struct FfmpegPipe {
    child: Child,
    stdin: Option<ChildStdin>,
    frame_bytes: usize,
    close_timeout: Duration,
}

impl FfmpegPipe {
    pub fn spawn(
        config: &EncoderConfig,
        path: &Path,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Self, EncoderError> {
        let mut child = Command::new(&config.ffmpeg_bin)
            .arg("-y")
            .args(["-f", "rawvideo"])
            .args(["-pix_fmt", "bgr24"])
            .args(["-s", &format!("{width}x{height}")])
            .args(["-r", &fps.to_string()])
            .args(["-i", "-"])
            .arg("-an")
            .args(["-c:v", "libx264"])
            .args(["-preset", &config.preset])
            .args(["-crf", &config.crf.to_string()])
            .args(["-b:v", &format!("{}k", config.bitrate_kbps)])
            .args(["-pix_fmt", "yuv420p"])
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EncoderError::Spawn {
                bin: config.ffmpeg_bin.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        Ok(Self {
            child,
            stdin,
            frame_bytes: width as usize * height as usize * 3,
            close_timeout: Duration::from_secs(config.close_timeout_secs),
        })
    }

    /// Writes one frame's raw bytes to the process pipe. Blocking; a slow
    /// encoder stalls the caller rather than dropping frames silently.
    pub fn write_frame(&mut self, frame: &Mat, path: &Path) -> Result<(), EncoderError> {
        let stdin = self.stdin.as_mut().ok_or_else(|| EncoderError::Write {
            path: path.to_path_buf(),
            reason: "pipe already closed".to_string(),
        })?;

        // VideoWriter frames may be row-padded; the pipe needs packed bytes
        let owned;
        let bytes = if frame.is_continuous() {
            frame.data_bytes()?
        } else {
            owned = frame.try_clone()?;
            owned.data_bytes()?
        };

        if bytes.len() != self.frame_bytes {
            return Err(EncoderError::Write {
                path: path.to_path_buf(),
                reason: format!(
                    "frame size mismatch: got {} bytes, expected {}",
                    bytes.len(),
                    self.frame_bytes
                ),
            });
        }

        stdin.write_all(bytes).map_err(|e| EncoderError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Closes the input stream and waits for the process to exit within the
    /// bounded timeout; on expiry the process is killed.
    pub fn finish(&mut self, path: &Path) -> Result<(), EncoderError> {
        // closing stdin signals EOF to the encoder
        drop(self.stdin.take());

        let deadline = Instant::now() + self.close_timeout;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    if status.success() {
                        return Ok(());
                    }
                    return Err(EncoderError::Close {
                        path: path.to_path_buf(),
                        reason: format!("encoder exited with {status}"),
                    });
                }
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = self.child.kill();
                        let _ = self.child.wait();
                        return Err(EncoderError::CloseTimeout(self.close_timeout));
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
                Err(e) => {
                    return Err(EncoderError::Close {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    /// Last-resort teardown for drop paths; never blocks on a full wait.
    pub fn abort(&mut self) {
        drop(self.stdin.take());
        if matches!(self.child.try_wait(), Ok(None)) {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}
