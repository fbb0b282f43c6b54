use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};

use super::KeyError;
use super::debouncer::{Debouncer, KeyStats};

/// OS facility that delivers raw key events into a debouncer.
pub trait CaptureBackend: Send {
    /// Start delivering events. Fails when the OS denies capture.
    fn open(&mut self, debouncer: Arc<Mutex<Debouncer>>) -> Result<(), KeyError>;
    fn close(&mut self);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyActive,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotActive,
}

/// Start/stop wrapper around a capture backend.
pub struct KeyCapture<C: CaptureBackend> {
    backend: C,
    debouncer: Arc<Mutex<Debouncer>>,
    active: bool,
}

impl<C: CaptureBackend> KeyCapture<C> {
    pub fn new(backend: C, debouncer: Debouncer) -> Self {
        Self {
            backend,
            debouncer: Arc::new(Mutex::new(debouncer)),
            active: false,
        }
    }

    pub fn start(&mut self) -> Result<StartOutcome, KeyError> {
        if self.active {
            warn!("key capture already active");
            return Ok(StartOutcome::AlreadyActive);
        }
        self.backend.open(Arc::clone(&self.debouncer))?;
        self.active = true;
        info!("key capture started");
        Ok(StartOutcome::Started)
    }

    pub fn stop(&mut self) -> StopOutcome {
        if !self.active {
            warn!("key capture not active");
            return StopOutcome::NotActive;
        }
        self.backend.close();
        self.active = false;
        info!("key capture stopped");
        StopOutcome::Stopped
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn backend(&self) -> &C {
        &self.backend
    }

    /// Shared debouncer, for sources outside the capture backend.
    pub fn debouncer(&self) -> MutexGuard<'_, Debouncer> {
        self.debouncer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn stats(&self) -> KeyStats {
        self.debouncer().stats()
    }
}

impl<C: CaptureBackend> Drop for KeyCapture<C> {
    fn drop(&mut self) {
        if self.is_active() {
            self.backend.close();
        }
    }
}
