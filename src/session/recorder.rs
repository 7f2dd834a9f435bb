//! Session orchestration and state machine.
//!
//! One recorder per recording run. Driven by an external callback once per
//! captured frame; control actions (pause/resume/close) may arrive from a
//! different thread, so all mutable state sits behind one mutex.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use opencv::core::Mat;
use tracing::{debug, info, warn};

use crate::config::{Config, EncoderConfig, RecordingConfig};
use crate::encoder::StreamEncoder;
use crate::error::{SessionError, StorageError};
use crate::metrics::{FrameMetrics, JointFrame, MetricAccumulator};
use crate::pose::LandmarkSet;
use crate::session::{SequenceCounter, SessionState, Variant};
use crate::storage::{SessionId, SessionStore};

use super::sampler::FrameSampler;

/// Identity of one recording run.
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub patient_id: i64,
    pub exercise_id: i64,
    pub notes: Option<String>,
    /// Non-empty subset of the three output variants.
    pub variants: Vec<Variant>,
}

/// Rendered frames submitted for one capture tick.
#[derive(Debug, Default)]
pub struct VariantFrames {
    pub raw: Option<Mat>,
    pub skeleton: Option<Mat>,
    pub clinical: Option<Mat>,
}

impl VariantFrames {
    fn get(&self, variant: Variant) -> Option<&Mat> {
        match variant {
            Variant::Raw => self.raw.as_ref(),
            Variant::Skeleton => self.skeleton.as_ref(),
            Variant::Clinical => self.clinical.as_ref(),
        }
    }
}

/// Outcome of `close`.
#[derive(Debug)]
pub struct CloseReport {
    pub session_id: Option<SessionId>,
    pub discarded: bool,
    /// (variant, output path, frames appended) per opened stream.
    pub streams: Vec<(Variant, PathBuf, u64)>,
    /// Aggregate rows persisted (3 per surviving metric unless discarded).
    pub metric_rows_saved: usize,
}

struct Inner {
    state: SessionState,
    session_id: Option<SessionId>,
    encoders: Vec<StreamEncoder>,
    sampler: FrameSampler,
    accumulator: MetricAccumulator,
    sequence: SequenceCounter,
    started_at: Option<Instant>,
    width: u32,
    height: u32,
    fps: u32,
}

pub struct SessionRecorder {
    recording: RecordingConfig,
    encoder_config: EncoderConfig,
    min_visibility: f32,
    store: Arc<dyn SessionStore>,
    params: SessionParams,
    inner: Mutex<Inner>,
}

impl SessionRecorder {
    pub fn new(config: &Config, store: Arc<dyn SessionStore>, params: SessionParams) -> Self {
        let sampler = FrameSampler::new(config.recording.sampling_interval_secs);
        Self {
            recording: config.recording.clone(),
            encoder_config: config.encoder.clone(),
            min_visibility: config.pose.min_visibility,
            store,
            params,
            inner: Mutex::new(Inner {
                state: SessionState::Created,
                session_id: None,
                encoders: Vec::new(),
                sampler,
                accumulator: MetricAccumulator::new(),
                sequence: SequenceCounter::new(),
                started_at: None,
                width: 0,
                height: 0,
                fps: 0,
            }),
        }
    }

    /// Pre-allocates the output streams and the storage row.
    ///
    /// Only two things are fatal here: the disk-space preflight and the
    /// storage row creation. An encoder that fails to open disables its
    /// variant and the session carries on.
    pub fn start(
        &self,
        width: u32,
        height: u32,
        fps_hint: Option<f64>,
    ) -> Result<SessionId, SessionError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            SessionState::Created => {}
            SessionState::Closed => return Err(SessionError::Closed),
            _ => return Err(SessionError::AlreadyStarted),
        }
        if self.params.variants.is_empty() {
            return Err(SessionError::NoVariants);
        }

        let out_dir = PathBuf::from(&self.recording.output_dir);
        fs::create_dir_all(&out_dir).map_err(|source| SessionError::OutputDir {
            path: out_dir.clone(),
            source,
        })?;

        self.preflight_disk(&out_dir)?;

        let fps = match fps_hint {
            Some(hint) if hint >= 1.0 => hint.round() as u32,
            _ => self.recording.default_fps,
        };

        for &variant in &self.params.variants {
            match StreamEncoder::open(
                &self.encoder_config,
                &out_dir,
                &self.recording.base_name,
                variant,
                width,
                height,
                fps,
            ) {
                Ok(encoder) => inner.encoders.push(encoder),
                Err(e) => {
                    warn!("variant {} disabled: {e}", variant.label());
                }
            }
        }

        let variant_paths: Vec<(Variant, PathBuf)> = inner
            .encoders
            .iter()
            .map(|e| (e.variant(), e.path().to_path_buf()))
            .collect();

        let session_id = match self.store.create_session(
            self.params.patient_id,
            self.params.exercise_id,
            &variant_paths,
            self.params.notes.as_deref(),
        ) {
            Ok(id) => id,
            Err(e) => {
                // no storage row, no session: release streams and remove stubs
                for encoder in &mut inner.encoders {
                    let _ = encoder.close();
                }
                for (_, path) in &variant_paths {
                    let _ = fs::remove_file(path);
                }
                inner.encoders.clear();
                return Err(e.into());
            }
        };

        inner.session_id = Some(session_id);
        inner.started_at = Some(Instant::now());
        inner.width = width;
        inner.height = height;
        inner.fps = fps;
        inner.state = SessionState::Recording;

        info!(
            "session {session_id} started: {width}x{height} @ {fps}fps, variants={:?}, sampling={}s",
            self.params.variants.iter().map(|v| v.label()).collect::<Vec<_>>(),
            self.recording.sampling_interval_secs,
        );
        Ok(session_id)
    }

    fn preflight_disk(&self, dir: &std::path::Path) -> Result<(), StorageError> {
        match fs2::available_space(dir) {
            Ok(bytes) => {
                let available_mb = bytes / (1024 * 1024);
                if available_mb < self.recording.min_free_mb {
                    return Err(StorageError::InsufficientDisk {
                        available_mb,
                        required_mb: self.recording.min_free_mb,
                    });
                }
                Ok(())
            }
            Err(e) => {
                // fail-safe: an unreadable quota must not block a recording
                warn!("disk preflight skipped ({e})");
                Ok(())
            }
        }
    }

    /// Sequence number the next submitted frame will carry, for on-screen
    /// overlays rendered before `record_frame`.
    pub fn sequence(&self) -> u64 {
        self.inner.lock().unwrap().sequence.current()
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().unwrap().state
    }

    pub fn is_paused(&self) -> bool {
        self.state() == SessionState::Paused
    }

    /// Output paths of the opened streams.
    pub fn video_paths(&self) -> Vec<(Variant, PathBuf)> {
        let inner = self.inner.lock().unwrap();
        inner
            .encoders
            .iter()
            .map(|e| (e.variant(), e.path().to_path_buf()))
            .collect()
    }

    /// Seconds since `start`.
    pub fn elapsed_secs(&self) -> f64 {
        let inner = self.inner.lock().unwrap();
        inner
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Processes one capture tick: computes and persists metrics, feeds the
    /// accumulator, appends every rendered frame to its stream, advances
    /// the sequence counter once.
    ///
    /// While paused this is a no-op. A frame whose landmarks are missing or
    /// incomplete is still encoded; only its metrics are skipped.
    pub fn record_frame(
        &self,
        landmarks: Option<&LandmarkSet>,
        frames: &VariantFrames,
    ) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            SessionState::Recording => {}
            SessionState::Paused => {
                debug!("frame dropped: session paused");
                return Ok(());
            }
            SessionState::Created => return Err(SessionError::NotStarted),
            SessionState::Closed => return Err(SessionError::Closed),
        }

        let elapsed = inner
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let frame_index = inner.sequence.current();

        let joints = landmarks
            .and_then(|set| JointFrame::from_landmarks(set, inner.width, inner.height, self.min_visibility));

        match joints {
            Some(joints) => {
                let samples = FrameMetrics::from_joints(&joints).samples();
                // every frame feeds the series, sampled or not
                inner.accumulator.record_all(&samples);

                if inner.sampler.should_persist(elapsed) {
                    if let Some(id) = inner.session_id {
                        if let Err(e) =
                            self.store.record_frame_data(id, frame_index, elapsed, &samples)
                        {
                            warn!("frame {frame_index}: persistence failed ({e})");
                        }
                    }
                }
            }
            None => {
                debug!("frame {frame_index}: landmarks incomplete, metrics skipped");
            }
        }

        for encoder in &mut inner.encoders {
            let Some(frame) = frames.get(encoder.variant()) else {
                continue;
            };
            if let Err(e) = encoder.append(frame) {
                warn!(
                    "frame {frame_index} dropped on {} stream: {e}",
                    encoder.variant().label()
                );
            }
        }

        inner.sequence.increment();
        Ok(())
    }

    /// Encode-only path for frames that carry no landmark data; equivalent
    /// to `record_frame(None, frames)`.
    pub fn write_frames(&self, frames: &VariantFrames) -> Result<(), SessionError> {
        self.record_frame(None, frames)
    }

    /// Suspends metric capture and encoding; streams stay open.
    pub fn pause(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            SessionState::Recording => {
                inner.state = SessionState::Paused;
                info!("session paused at seq {}", inner.sequence.current());
                Ok(())
            }
            SessionState::Paused => Ok(()),
            SessionState::Created => Err(SessionError::NotStarted),
            SessionState::Closed => Err(SessionError::Closed),
        }
    }

    pub fn resume(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            SessionState::Paused => {
                inner.state = SessionState::Recording;
                info!("session resumed at seq {}", inner.sequence.current());
                Ok(())
            }
            SessionState::Recording => Ok(()),
            SessionState::Created => Err(SessionError::NotStarted),
            SessionState::Closed => Err(SessionError::Closed),
        }
    }

    /// Releases every stream, then either aggregates and persists summary
    /// statistics (save) or deletes the storage row and the written files
    /// (discard). Individual failures are logged, never raised; the state
    /// becomes terminal either way.
    pub fn close(&self, discard: bool) -> Result<CloseReport, SessionError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.state == SessionState::Closed {
            return Err(SessionError::Closed);
        }
        inner.state = SessionState::Closed;

        let session_id = inner.session_id;
        info!(
            "closing session {:?}: discard={discard}, frames={}",
            session_id,
            inner.sequence.current()
        );

        let mut streams = Vec::new();
        for encoder in &mut inner.encoders {
            if let Err(e) = encoder.close() {
                warn!("stream {} close failed: {e}", encoder.variant().label());
            }
            streams.push((
                encoder.variant(),
                encoder.path().to_path_buf(),
                encoder.frames_written(),
            ));
        }

        let mut metric_rows_saved = 0;
        if discard {
            if let Some(id) = session_id {
                if let Err(e) = self.store.delete_session(id) {
                    warn!("session {id} row deletion failed ({e})");
                }
            }
            for (variant, path, _) in &streams {
                match fs::remove_file(path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => warn!("{} file {} not removed ({e})", variant.label(), path.display()),
                }
            }
        } else if let Some(id) = session_id {
            for summary in inner.accumulator.summaries() {
                let base = summary.name.as_str();
                for (suffix, value) in [
                    ("min", summary.min),
                    ("max", summary.max),
                    ("range", summary.range),
                ] {
                    let row = format!("{base}_{suffix}");
                    match self.store.add_metric(id, &row, value, summary.unit) {
                        Ok(()) => metric_rows_saved += 1,
                        Err(e) => warn!("metric {row} not saved ({e})"),
                    }
                }
            }
        }

        info!(
            "session {:?} closed: {} streams, {metric_rows_saved} metric rows, discarded={discard}",
            session_id,
            streams.len()
        );

        Ok(CloseReport {
            session_id,
            discarded: discard,
            streams,
            metric_rows_saved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Unit;
    use crate::pose::{Landmark, LandmarkIndex, LandmarkSet};
    use crate::storage::MemoryStore;
    use opencv::core::{Scalar, Size, CV_8UC3};
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "recon_motion_test_{}_{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn test_config(out_dir: &std::path::Path, sampling: f64) -> Config {
        let mut config = Config::default();
        config.recording.output_dir = out_dir.to_string_lossy().to_string();
        config.recording.base_name = "t".to_string();
        config.recording.sampling_interval_secs = sampling;
        config.recording.min_free_mb = 1;
        // force the deterministic codec-writer backend in tests
        config.encoder.prefer_pipe = false;
        config.encoder.ffmpeg_bin = "ffmpeg-test-missing".to_string();
        config
    }

    fn params(variants: Vec<Variant>) -> SessionParams {
        SessionParams {
            patient_id: 1,
            exercise_id: 2,
            notes: Some("test".to_string()),
            variants,
        }
    }

    /// All 33 landmarks visible at spread-out positions.
    fn full_landmarks() -> LandmarkSet {
        let mut set = LandmarkSet::default();
        for i in 0..LandmarkIndex::COUNT {
            let x = 0.2 + 0.02 * i as f32;
            let y = 0.1 + 0.025 * i as f32;
            set.landmarks[i] = Landmark::new(x, y, 0.0, 0.9);
        }
        set
    }

    fn small_frame() -> Mat {
        Mat::new_size_with_default(Size::new(64, 48), CV_8UC3, Scalar::all(40.0)).unwrap()
    }

    fn cleanup(dir: &std::path::Path) {
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_five_frames_clinical_end_to_end() {
        let dir = temp_dir();
        let store = Arc::new(MemoryStore::new());
        let recorder = SessionRecorder::new(
            &test_config(&dir, 0.0),
            store.clone(),
            params(vec![Variant::Clinical]),
        );

        let sid = recorder.start(64, 48, Some(30.0)).unwrap();
        let landmarks = full_landmarks();
        for _ in 0..5 {
            let frames = VariantFrames {
                clinical: Some(small_frame()),
                ..Default::default()
            };
            recorder.record_frame(Some(&landmarks), &frames).unwrap();
        }

        assert_eq!(recorder.sequence(), 5);
        assert_eq!(store.frame_rows(sid).len(), 5);

        let report = recorder.close(false).unwrap();
        assert_eq!(report.streams.len(), 1);
        let (variant, path, frames_written) = &report.streams[0];
        assert_eq!(*variant, Variant::Clinical);
        assert_eq!(*frames_written, 5);
        assert!(path.file_name().unwrap().to_string_lossy().contains("_clinical_64x48_30fps_"));

        // 9 metrics x {min, max, range}
        assert_eq!(report.metric_rows_saved, 27);
        cleanup(&dir);
    }

    #[test]
    fn test_metric_units_follow_definition() {
        let dir = temp_dir();
        let store = Arc::new(MemoryStore::new());
        let recorder = SessionRecorder::new(
            &test_config(&dir, 0.0),
            store.clone(),
            params(vec![Variant::Clinical]),
        );

        let sid = recorder.start(64, 48, Some(30.0)).unwrap();
        let frames = VariantFrames {
            clinical: Some(small_frame()),
            ..Default::default()
        };
        recorder.record_frame(Some(&full_landmarks()), &frames).unwrap();
        recorder.close(false).unwrap();

        let rows = store.metric_rows(sid);
        let unit_of = |name: &str| rows.iter().find(|r| r.name == name).unwrap().unit;
        assert_eq!(unit_of("symmetry_knee_y_max"), Unit::Pixels);
        assert_eq!(unit_of("symmetry_knee_y_range"), Unit::Pixels);
        assert_eq!(unit_of("angle_arm_r_max"), Unit::Degrees);
        assert_eq!(unit_of("symmetry_angle_leg_min"), Unit::Degrees);
        cleanup(&dir);
    }

    #[test]
    fn test_paused_frames_are_inert() {
        let dir = temp_dir();
        let store = Arc::new(MemoryStore::new());
        let recorder = SessionRecorder::new(
            &test_config(&dir, 0.0),
            store.clone(),
            params(vec![Variant::Raw]),
        );

        let sid = recorder.start(64, 48, None).unwrap();
        let landmarks = full_landmarks();
        let make_frames = || VariantFrames {
            raw: Some(small_frame()),
            ..Default::default()
        };

        recorder.record_frame(Some(&landmarks), &make_frames()).unwrap();
        recorder.record_frame(Some(&landmarks), &make_frames()).unwrap();
        recorder.pause().unwrap();
        assert!(recorder.is_paused());
        for _ in 0..3 {
            recorder.record_frame(Some(&landmarks), &make_frames()).unwrap();
        }
        assert_eq!(recorder.sequence(), 2);
        assert_eq!(store.frame_rows(sid).len(), 2);

        recorder.resume().unwrap();
        recorder.record_frame(Some(&landmarks), &make_frames()).unwrap();
        assert_eq!(recorder.sequence(), 3);

        let report = recorder.close(false).unwrap();
        assert_eq!(report.streams[0].2, 3);
        cleanup(&dir);
    }

    #[test]
    fn test_incomplete_landmarks_still_encoded() {
        let dir = temp_dir();
        let store = Arc::new(MemoryStore::new());
        let recorder = SessionRecorder::new(
            &test_config(&dir, 0.0),
            store.clone(),
            params(vec![Variant::Raw]),
        );

        let sid = recorder.start(64, 48, None).unwrap();
        let mut landmarks = full_landmarks();
        landmarks.landmarks[LandmarkIndex::LeftHeel as usize].visibility = 0.1;

        let frames = VariantFrames {
            raw: Some(small_frame()),
            ..Default::default()
        };
        recorder.record_frame(Some(&landmarks), &frames).unwrap();
        recorder.record_frame(None, &frames).unwrap();

        assert_eq!(recorder.sequence(), 2);
        assert!(store.frame_rows(sid).is_empty());

        let report = recorder.close(false).unwrap();
        assert_eq!(report.streams[0].2, 2);
        assert_eq!(report.metric_rows_saved, 0);
        cleanup(&dir);
    }

    #[test]
    fn test_sampling_gates_storage_but_not_accumulation() {
        let dir = temp_dir();
        let store = Arc::new(MemoryStore::new());
        // interval far longer than the test: only the first frame persists
        let recorder = SessionRecorder::new(
            &test_config(&dir, 1000.0),
            store.clone(),
            params(vec![Variant::Raw]),
        );

        let sid = recorder.start(64, 48, None).unwrap();
        let frames = || VariantFrames {
            raw: Some(small_frame()),
            ..Default::default()
        };

        // knee-y spread differs per frame; the extreme is in a frame the
        // sampler does not persist
        for knee_y in [0.50, 0.80, 0.55] {
            let mut landmarks = full_landmarks();
            landmarks.landmarks[LandmarkIndex::LeftKnee as usize] =
                Landmark::new(0.4, knee_y, 0.0, 0.9);
            landmarks.landmarks[LandmarkIndex::RightKnee as usize] =
                Landmark::new(0.6, 0.50, 0.0, 0.9);
            recorder.record_frame(Some(&landmarks), &frames()).unwrap();
        }

        assert_eq!(store.frame_rows(sid).len(), 1);

        recorder.close(false).unwrap();
        let rows = store.metric_rows(sid);
        let max = rows
            .iter()
            .find(|r| r.name == "symmetry_knee_y_max")
            .unwrap()
            .value;
        // 0.80 vs 0.50 at height 48 -> 14.4 px, only reachable if the
        // unsampled middle frame fed the series
        assert!((max - 14.4).abs() < 1e-3, "max={max}");
        cleanup(&dir);
    }

    #[test]
    fn test_discard_deletes_row_and_files() {
        let dir = temp_dir();
        let store = Arc::new(MemoryStore::new());
        let recorder = SessionRecorder::new(
            &test_config(&dir, 0.0),
            store.clone(),
            params(vec![Variant::Raw, Variant::Clinical]),
        );

        let sid = recorder.start(64, 48, Some(30.0)).unwrap();
        let frames = VariantFrames {
            raw: Some(small_frame()),
            clinical: Some(small_frame()),
            ..Default::default()
        };
        recorder.record_frame(Some(&full_landmarks()), &frames).unwrap();

        let paths = recorder.video_paths();
        assert_eq!(paths.len(), 2);

        let report = recorder.close(true).unwrap();
        assert!(report.discarded);
        assert!(store.is_deleted(sid));
        for (_, path) in paths {
            assert!(!path.exists(), "{} still on disk", path.display());
        }
        cleanup(&dir);
    }

    #[test]
    fn test_failed_encoder_open_does_not_abort_start_or_discard() {
        let dir = temp_dir();
        let store = Arc::new(MemoryStore::new());
        let recorder = SessionRecorder::new(
            &test_config(&dir, 0.0),
            store.clone(),
            params(vec![Variant::Clinical]),
        );

        // 0x0 output: every backend refuses to open, the variant is
        // disabled, start itself must still succeed
        let sid = recorder.start(0, 0, Some(30.0)).unwrap();
        assert!(recorder.video_paths().is_empty());

        let report = recorder.close(true).unwrap();
        assert!(report.discarded);
        assert!(store.is_deleted(sid));
        cleanup(&dir);
    }

    #[test]
    fn test_state_machine_guards() {
        let dir = temp_dir();
        let store = Arc::new(MemoryStore::new());
        let recorder = SessionRecorder::new(
            &test_config(&dir, 0.0),
            store.clone(),
            params(vec![Variant::Raw]),
        );

        let frames = VariantFrames::default();
        assert!(matches!(
            recorder.record_frame(None, &frames),
            Err(SessionError::NotStarted)
        ));
        assert!(matches!(recorder.pause(), Err(SessionError::NotStarted)));

        recorder.start(64, 48, None).unwrap();
        assert!(matches!(
            recorder.start(64, 48, None),
            Err(SessionError::AlreadyStarted)
        ));

        recorder.close(false).unwrap();
        assert!(matches!(recorder.close(false), Err(SessionError::Closed)));
        assert!(matches!(
            recorder.record_frame(None, &frames),
            Err(SessionError::Closed)
        ));
        assert!(matches!(recorder.resume(), Err(SessionError::Closed)));
        cleanup(&dir);
    }

    #[test]
    fn test_empty_variants_rejected() {
        let dir = temp_dir();
        let store = Arc::new(MemoryStore::new());
        let recorder =
            SessionRecorder::new(&test_config(&dir, 0.0), store, params(Vec::new()));
        assert!(matches!(
            recorder.start(64, 48, None),
            Err(SessionError::NoVariants)
        ));
        cleanup(&dir);
    }

    /// Store whose `add_metric` rejects one metric family.
    struct FlakyStore {
        inner: MemoryStore,
    }

    impl crate::storage::SessionStore for FlakyStore {
        fn create_session(
            &self,
            patient_id: i64,
            exercise_id: i64,
            variant_paths: &[(Variant, PathBuf)],
            notes: Option<&str>,
        ) -> Result<SessionId, StorageError> {
            self.inner.create_session(patient_id, exercise_id, variant_paths, notes)
        }

        fn record_frame_data(
            &self,
            session: SessionId,
            frame_index: u64,
            elapsed_secs: f64,
            metrics: &[crate::metrics::MetricSample],
        ) -> Result<(), StorageError> {
            self.inner.record_frame_data(session, frame_index, elapsed_secs, metrics)
        }

        fn add_metric(
            &self,
            session: SessionId,
            name: &str,
            value: f64,
            unit: Unit,
        ) -> Result<(), StorageError> {
            if name.starts_with("angle_arm_r") {
                return Err(StorageError::Backend("simulated outage".to_string()));
            }
            self.inner.add_metric(session, name, value, unit)
        }

        fn delete_session(&self, session: SessionId) -> Result<(), StorageError> {
            self.inner.delete_session(session)
        }
    }

    #[test]
    fn test_one_failed_statistic_does_not_block_others() {
        let dir = temp_dir();
        let store = Arc::new(FlakyStore {
            inner: MemoryStore::new(),
        });
        let recorder = SessionRecorder::new(
            &test_config(&dir, 0.0),
            store.clone(),
            params(vec![Variant::Raw]),
        );

        let sid = recorder.start(64, 48, None).unwrap();
        let frames = VariantFrames {
            raw: Some(small_frame()),
            ..Default::default()
        };
        recorder.record_frame(Some(&full_landmarks()), &frames).unwrap();

        let report = recorder.close(false).unwrap();
        // 9 metrics x 3 rows, minus the 3 rejected angle_arm_r rows
        assert_eq!(report.metric_rows_saved, 24);
        let rows = store.inner.metric_rows(sid);
        assert!(rows.iter().all(|r| !r.name.starts_with("angle_arm_r")));
        assert!(rows.iter().any(|r| r.name == "angle_arm_l_max"));
        cleanup(&dir);
    }
}
