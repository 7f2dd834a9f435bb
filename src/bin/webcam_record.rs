//! Webcam demo: captures frames, runs the pose detector, renders the three
//! output variants, and drives the session recorder until Ctrl-C.
//!
//! Only a wiring example; the clinic front-end owns the real capture loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture, VideoCaptureAPIs};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use recon_motion::config::Config;
use recon_motion::metrics::{FrameMetrics, JointFrame};
use recon_motion::pose::PoseDetector;
use recon_motion::render::overlay;
use recon_motion::session::{SessionParams, SessionRecorder, Variant, VariantFrames};
use recon_motion::storage::MemoryStore;

const CONFIG_PATH: &str = "config.toml";

// ===========================================================================
// Camera
// ===========================================================================

fn open_camera(index: i32, fps: u32) -> Result<(VideoCapture, u32, u32, f64)> {
    let mut capture = VideoCapture::new(index, VideoCaptureAPIs::CAP_ANY as i32)
        .with_context(|| format!("failed to open camera {index}"))?;
    if !capture.is_opened()? {
        anyhow::bail!("camera {index} is not available");
    }

    capture.set(videoio::CAP_PROP_FPS, fps as f64)?;
    capture.set(videoio::CAP_PROP_BUFFERSIZE, 1.0)?;

    let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
    let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
    let actual_fps = capture.get(videoio::CAP_PROP_FPS)?;

    Ok((capture, width, height, actual_fps))
}

// ===========================================================================
// Main loop
// ===========================================================================

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    info!("webcam_record ({})", env!("GIT_VERSION"));

    let config = Config::load_or_default(CONFIG_PATH);

    let running = Arc::new(AtomicBool::new(true));
    let running_ref = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_ref.store(false, Ordering::SeqCst);
    })
    .context("failed to install Ctrl-C handler")?;

    let mut detector = PoseDetector::from_config(&config.pose)
        .with_context(|| format!("pose model {} not loaded", config.pose.model_path))?;

    let (mut camera, width, height, fps_hint) = open_camera(0, config.recording.default_fps)?;
    info!("camera open: {width}x{height} @ {fps_hint}fps");

    let store = Arc::new(MemoryStore::new());
    let recorder = SessionRecorder::new(
        &config,
        store.clone(),
        SessionParams {
            patient_id: 1,
            exercise_id: 1,
            notes: Some("webcam demo".to_string()),
            variants: vec![Variant::Raw, Variant::Skeleton, Variant::Clinical],
        },
    );

    let session_id = recorder.start(width, height, Some(fps_hint))?;
    info!("session {session_id} recording, Ctrl-C to stop");

    let min_visibility = config.pose.min_visibility;
    let arm_angle_alert = config.recording.arm_angle_alert;
    let fps = fps_hint.round() as u32;

    while running.load(Ordering::SeqCst) {
        let mut frame = Mat::default();
        if !camera.read(&mut frame)? || frame.empty() {
            warn!("empty frame from camera, stopping");
            break;
        }

        let landmarks = match detector.detect(&frame) {
            Ok(lm) => lm,
            Err(e) => {
                warn!("pose inference failed ({e}), frame skipped for metrics");
                None
            }
        };

        let sequence = recorder.sequence();
        let frame_index = sequence;

        let joints = landmarks
            .as_ref()
            .and_then(|set| JointFrame::from_landmarks(set, width, height, min_visibility));
        let metrics = joints.as_ref().map(FrameMetrics::from_joints);

        let mut clinical = overlay::clinical_frame(
            &frame,
            joints.as_ref(),
            metrics.as_ref(),
            arm_angle_alert,
            sequence,
            frame_index,
            fps,
        )?;
        overlay::draw_status_dot(&mut clinical, recorder.is_paused())?;

        let frames = VariantFrames {
            raw: Some(overlay::raw_frame(&frame, sequence)?),
            skeleton: Some(overlay::skeleton_frame(
                width,
                height,
                landmarks.as_ref(),
                min_visibility,
                sequence,
            )?),
            clinical: Some(clinical),
        };

        recorder.record_frame(landmarks.as_ref(), &frames)?;
    }

    let report = recorder.close(false)?;
    info!(
        "session {:?} saved: {} metric rows",
        report.session_id, report.metric_rows_saved
    );
    for (variant, path, frames) in &report.streams {
        info!("  {}: {} ({frames} frames)", variant.label(), path.display());
    }

    Ok(())
}
