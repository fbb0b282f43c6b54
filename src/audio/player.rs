use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use super::backend::Backend;
use super::sink::uri_to_path;
use super::thread::spawn_engine_thread;
use super::types::{BackendError, BackendState, EngineCmd, EngineStatus, StatusHandle};

/// `Backend` implemented on top of a `rodio` engine thread.
///
/// The handle only sends commands and reads the status the thread
/// publishes, so it can be moved freely between threads.
pub struct RodioBackend {
    tx: Sender<EngineCmd>,
    status: StatusHandle,
    join: Option<JoinHandle<()>>,
}

impl RodioBackend {
    /// Start the engine thread on the default output device.
    pub fn spawn() -> Result<Self, BackendError> {
        let (tx, rx) = mpsc::channel::<EngineCmd>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let status: StatusHandle = Arc::new(Mutex::new(EngineStatus::default()));

        let join = spawn_engine_thread(rx, status.clone(), ready_tx);

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                tx,
                status,
                join: Some(join),
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(BackendError::Disconnected),
        }
    }

    fn send(&self, cmd: EngineCmd) -> Result<(), BackendError> {
        self.tx.send(cmd).map_err(|_| BackendError::Disconnected)
    }

    fn status(&self) -> Option<EngineStatus> {
        self.status.lock().ok().map(|s| s.clone())
    }
}

impl Backend for RodioBackend {
    fn load(&mut self, uri: &str) -> Result<(), BackendError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(EngineCmd::Load {
            path: uri_to_path(uri).to_string(),
            reply: reply_tx,
        })?;
        reply_rx.recv().map_err(|_| BackendError::Disconnected)?
    }

    fn play(&mut self) -> Result<(), BackendError> {
        self.send(EngineCmd::Play)
    }

    fn pause(&mut self) -> Result<(), BackendError> {
        self.send(EngineCmd::Pause)
    }

    fn stop(&mut self) -> Result<(), BackendError> {
        self.send(EngineCmd::Stop)
    }

    fn set_volume(&mut self, volume: u8) -> Result<(), BackendError> {
        self.send(EngineCmd::SetVolume(volume.min(100)))
    }

    fn position(&self) -> f64 {
        match self.status() {
            Some(EngineStatus {
                position,
                length: Some(length),
                ..
            }) if !length.is_zero() => (position.as_secs_f64() / length.as_secs_f64()).min(1.0),
            _ => -1.0,
        }
    }

    fn length(&self) -> i64 {
        self.status()
            .and_then(|s| s.length)
            .map_or(0, |l| i64::try_from(l.as_millis()).unwrap_or(i64::MAX))
    }

    fn state(&self) -> BackendState {
        self.status().map_or(BackendState::Error, |s| s.state)
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        let _ = self.tx.send(EngineCmd::Quit);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}
