//! Audio-related small types and handles.
//!
//! This module defines the backend state reported to the session
//! controller, the commands understood by the engine thread and the
//! status it publishes.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

/// Transport state as reported by a playback backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum BackendState {
    /// Nothing loaded.
    #[default]
    Idle,
    Playing,
    Paused,
    Stopped,
    /// The loaded media played to its end.
    Ended,
    /// The loaded media failed while playing.
    Error,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no audio output device: {0}")]
    NoOutput(String),
    #[error("failed to open {uri}: {reason}")]
    Load { uri: String, reason: String },
    #[error("audio engine thread is gone")]
    Disconnected,
}

#[derive(Debug)]
pub(super) enum EngineCmd {
    /// Decode `path` into a fresh paused sink, replacing any current one.
    Load {
        path: String,
        reply: Sender<Result<(), BackendError>>,
    },
    Play,
    Pause,
    Stop,
    SetVolume(u8),
    Quit,
}

/// Status published by the engine thread on every tick.
#[derive(Debug, Clone, Default)]
pub(super) struct EngineStatus {
    pub state: BackendState,
    pub position: Duration,
    pub length: Option<Duration>,
}

pub(super) type StatusHandle = Arc<Mutex<EngineStatus>>;
