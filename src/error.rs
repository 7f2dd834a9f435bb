//! Error taxonomy for the recording pipeline.
//!
//! Only `StorageError::InsufficientDisk` is fatal to session start; every
//! other failure degrades (variant disabled, frame dropped, row skipped)
//! so a long recording is never lost to one transient fault.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures at the storage collaborator boundary.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("insufficient disk space: {available_mb} MB free, {required_mb} MB required")]
    InsufficientDisk {
        available_mb: u64,
        required_mb: u64,
    },

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Failures of one output video stream.
#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("failed to spawn encoder process `{bin}`: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no usable codec, tried {tried:?}")]
    CodecUnavailable { tried: Vec<&'static str> },

    #[error("frame write failed for {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("encoder close failed for {path}: {reason}")]
    Close { path: PathBuf, reason: String },

    #[error("encoder process did not exit within {0:?}")]
    CloseTimeout(Duration),

    #[error(transparent)]
    OpenCv(#[from] opencv::Error),

    #[error("encoder I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Session state-machine violations surfaced to the caller.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session already started")]
    AlreadyStarted,

    #[error("session not started")]
    NotStarted,

    #[error("session already closed")]
    Closed,

    #[error("no active variants configured")]
    NoVariants,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
