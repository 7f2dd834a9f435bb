//! Storage collaborator boundary.
//!
//! The actual persistence layer (SQL, CRUD forms, reports) lives outside
//! this crate; the recorder only sees this trait. Every call is an
//! independent fallible operation — the recorder never assumes an open
//! transaction spans multiple calls and does not retry internally.

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::StorageError;
use crate::metrics::{MetricSample, Unit};
use crate::session::Variant;

/// Opaque session identity assigned by the storage collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub trait SessionStore: Send + Sync {
    /// Creates the session row and returns its id.
    fn create_session(
        &self,
        patient_id: i64,
        exercise_id: i64,
        variant_paths: &[(Variant, PathBuf)],
        notes: Option<&str>,
    ) -> Result<SessionId, StorageError>;

    /// Persists one frame's metric map.
    fn record_frame_data(
        &self,
        session: SessionId,
        frame_index: u64,
        elapsed_secs: f64,
        metrics: &[MetricSample],
    ) -> Result<(), StorageError>;

    /// Persists one aggregated metric row.
    fn add_metric(
        &self,
        session: SessionId,
        name: &str,
        value: f64,
        unit: Unit,
    ) -> Result<(), StorageError>;

    /// Deletes the session row and everything hanging off it.
    fn delete_session(&self, session: SessionId) -> Result<(), StorageError>;
}

/// One persisted frame row.
#[derive(Debug, Clone)]
pub struct FrameRow {
    pub session: SessionId,
    pub frame_index: u64,
    pub elapsed_secs: f64,
    pub metrics: Vec<MetricSample>,
}

/// One persisted aggregate row.
#[derive(Debug, Clone)]
pub struct MetricRow {
    pub session: SessionId,
    pub name: String,
    pub value: f64,
    pub unit: Unit,
}

#[derive(Debug, Default)]
struct MemoryInner {
    next_id: i64,
    sessions: Vec<(SessionId, Vec<(Variant, PathBuf)>)>,
    frames: Vec<FrameRow>,
    metrics: Vec<MetricRow>,
    deleted: Vec<SessionId>,
}

/// In-memory store used by the demo binary and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_rows(&self, session: SessionId) -> Vec<FrameRow> {
        let inner = self.inner.lock().unwrap();
        inner
            .frames
            .iter()
            .filter(|r| r.session == session)
            .cloned()
            .collect()
    }

    pub fn metric_rows(&self, session: SessionId) -> Vec<MetricRow> {
        let inner = self.inner.lock().unwrap();
        inner
            .metrics
            .iter()
            .filter(|r| r.session == session)
            .cloned()
            .collect()
    }

    pub fn is_deleted(&self, session: SessionId) -> bool {
        self.inner.lock().unwrap().deleted.contains(&session)
    }

    pub fn session_count(&self) -> usize {
        self.inner.lock().unwrap().sessions.len()
    }
}

impl SessionStore for MemoryStore {
    fn create_session(
        &self,
        patient_id: i64,
        exercise_id: i64,
        variant_paths: &[(Variant, PathBuf)],
        notes: Option<&str>,
    ) -> Result<SessionId, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = SessionId(inner.next_id);
        inner.sessions.push((id, variant_paths.to_vec()));
        tracing::debug!(
            "session {id} created (patient={patient_id}, exercise={exercise_id}, notes={})",
            notes.unwrap_or("-")
        );
        Ok(id)
    }

    fn record_frame_data(
        &self,
        session: SessionId,
        frame_index: u64,
        elapsed_secs: f64,
        metrics: &[MetricSample],
    ) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.frames.push(FrameRow {
            session,
            frame_index,
            elapsed_secs,
            metrics: metrics.to_vec(),
        });
        Ok(())
    }

    fn add_metric(
        &self,
        session: SessionId,
        name: &str,
        value: f64,
        unit: Unit,
    ) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.metrics.push(MetricRow {
            session,
            name: name.to_string(),
            value,
            unit,
        });
        Ok(())
    }

    fn delete_session(&self, session: SessionId) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.retain(|(id, _)| *id != session);
        inner.frames.retain(|r| r.session != session);
        inner.metrics.retain(|r| r.session != session);
        inner.deleted.push(session);
        Ok(())
    }
}
