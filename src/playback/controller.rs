use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use crate::audio::Backend;
use crate::library::TrackDescriptor;

use super::error::PlaybackError;
use super::poller;
use super::queue::Queue;
use super::types::{ControllerSettings, EndLatch, ProgressSnapshot, TransportState};

/// What one poller tick decided.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Tick {
    /// Nothing to do this round.
    Idle,
    /// The track ended; advance once the delay elapsed, unless `generation` moved on.
    Advance(u64),
    /// Transport is stopped; the poller must exit.
    Exit,
}

/// State guarded by the controller's single lock.
pub(super) struct Session<B> {
    backend: B,
    queue: Queue,
    transport: TransportState,
    current: Option<TrackDescriptor>,
    volume: u8,
    unmuted_volume: Option<u8>,
    auto_advance: bool,
    latch: EndLatch,
    /// Bumped on every play/stop so a pending auto-advance can tell it was superseded.
    generation: u64,
    pub(super) poller_alive: bool,
    position_secs: f64,
    duration_secs: f64,
}

impl<B: Backend> Session<B> {
    pub(super) fn generation(&self) -> u64 {
        self.generation
    }

    pub(super) fn transport(&self) -> TransportState {
        self.transport
    }

    /// Sample the backend once and decide what the poller does next.
    pub(super) fn tick(&mut self) -> Tick {
        match self.transport {
            TransportState::Stopped => Tick::Exit,
            TransportState::Paused => Tick::Idle,
            TransportState::Playing => {
                let state = self.backend.state();
                let position = self.backend.position();
                let length_ms = self.backend.length();
                if length_ms > 0 {
                    self.duration_secs = length_ms as f64 / 1000.0;
                    if position >= 0.0 {
                        self.position_secs = position * self.duration_secs;
                    }
                }

                if !self.latch.observe(state) {
                    return Tick::Idle;
                }

                if self.auto_advance && !self.queue.is_at_end() {
                    debug!("track ended, advancing after delay");
                    Tick::Advance(self.generation)
                } else {
                    info!("playback finished");
                    self.finish();
                    Tick::Exit
                }
            }
        }
    }

    /// Let the next tick report the current end again.
    pub(super) fn rearm_end(&mut self) {
        self.latch.reset();
    }

    pub(super) fn queue_advance(&mut self) -> Option<TrackDescriptor> {
        self.queue.advance().ok().cloned()
    }

    /// Stop the backend and forget the current track.
    pub(super) fn finish(&mut self) {
        if let Err(e) = self.backend.stop() {
            warn!("backend stop failed: {e}");
        }
        self.transport = TransportState::Stopped;
        self.current = None;
        self.latch.reset();
        self.generation += 1;
        self.position_secs = 0.0;
    }

    fn load_and_start(&mut self, track: &TrackDescriptor) -> Result<(), PlaybackError> {
        self.backend.stop()?;
        let uri = track
            .resolve_stream()
            .ok_or_else(|| PlaybackError::StreamUnavailable(track.display()))?;
        self.backend.load(&uri)?;
        self.backend.set_volume(self.volume)?;
        self.backend.play()?;
        Ok(())
    }
}

pub(super) struct Shared<B> {
    session: Mutex<Session<B>>,
    pub(super) settings: ControllerSettings,
}

impl<B> Shared<B> {
    pub(super) fn lock(&self) -> MutexGuard<'_, Session<B>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Load `track` and start it, spawning the poller when none is alive.
///
/// Must be called with the session lock held.
pub(super) fn play_locked<B: Backend + 'static>(
    shared: &Arc<Shared<B>>,
    s: &mut Session<B>,
    track: TrackDescriptor,
) -> Result<(), PlaybackError> {
    s.generation += 1;
    s.latch.reset();

    if let Err(e) = s.load_and_start(&track) {
        s.transport = TransportState::Stopped;
        s.current = None;
        return Err(e);
    }

    info!("now playing: {}", track.display());
    s.transport = TransportState::Playing;
    s.position_secs = 0.0;
    s.duration_secs = track.duration_secs() as f64;
    s.current = Some(track);

    if !s.poller_alive {
        s.poller_alive = true;
        poller::spawn(Arc::clone(shared));
    }
    Ok(())
}

/// Owns the backend, the queue and the transport state of one session.
///
/// Cloning yields another handle to the same session.
pub struct SessionController<B: Backend + 'static> {
    pub(super) shared: Arc<Shared<B>>,
}

impl<B: Backend + 'static> Clone for SessionController<B> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<B: Backend + 'static> SessionController<B> {
    pub fn new(backend: B, settings: ControllerSettings) -> Self {
        let session = Session {
            backend,
            queue: Queue::new(),
            transport: TransportState::Stopped,
            current: None,
            volume: settings.volume.min(100),
            unmuted_volume: None,
            auto_advance: settings.auto_advance,
            latch: EndLatch::default(),
            generation: 0,
            poller_alive: false,
            position_secs: 0.0,
            duration_secs: 0.0,
        };
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                settings,
            }),
        }
    }

    /// Replace the queue wholesale; the cursor resets to the first track.
    ///
    /// Whatever is playing keeps playing until the next play/next/previous.
    pub fn replace_queue(&self, tracks: Vec<TrackDescriptor>) {
        self.shared.lock().queue.replace(tracks);
    }

    /// Queue contents and cursor.
    pub fn queue(&self) -> (Vec<TrackDescriptor>, usize) {
        let s = self.shared.lock();
        (s.queue.tracks().to_vec(), s.queue.cursor())
    }

    /// Track under the queue cursor.
    pub fn queue_current(&self) -> Option<TrackDescriptor> {
        self.shared.lock().queue.current().cloned()
    }

    /// Stop whatever plays and start `track`.
    pub fn play(&self, track: TrackDescriptor) -> Result<(), PlaybackError> {
        let mut s = self.shared.lock();
        play_locked(&self.shared, &mut s, track)
    }

    /// Move the cursor to `index` and play that track.
    pub fn play_index(&self, index: usize) -> Result<TrackDescriptor, PlaybackError> {
        let mut s = self.shared.lock();
        let track = s.queue.jump_to(index)?.clone();
        play_locked(&self.shared, &mut s, track.clone())?;
        Ok(track)
    }

    /// Toggle between playing and paused, returning the new state.
    pub fn pause_resume(&self) -> Result<TransportState, PlaybackError> {
        let mut s = self.shared.lock();
        match s.transport {
            TransportState::Stopped => Err(PlaybackError::NoActiveTrack),
            TransportState::Playing => {
                s.backend.pause()?;
                s.transport = TransportState::Paused;
                Ok(TransportState::Paused)
            }
            TransportState::Paused => {
                s.backend.play()?;
                s.transport = TransportState::Playing;
                Ok(TransportState::Playing)
            }
        }
    }

    pub fn stop(&self) {
        self.shared.lock().finish();
    }

    pub fn next(&self) -> Result<TrackDescriptor, PlaybackError> {
        let mut s = self.shared.lock();
        let track = s.queue.advance()?.clone();
        play_locked(&self.shared, &mut s, track.clone())?;
        Ok(track)
    }

    pub fn previous(&self) -> Result<TrackDescriptor, PlaybackError> {
        let mut s = self.shared.lock();
        let track = s.queue.retreat()?.clone();
        play_locked(&self.shared, &mut s, track.clone())?;
        Ok(track)
    }

    /// Clamp to 0-100 and apply; returns the applied volume.
    pub fn set_volume(&self, volume: i32) -> u8 {
        set_volume_locked(&mut self.shared.lock(), volume)
    }

    /// Step the volume; read and write happen under one lock.
    pub fn adjust_volume(&self, delta: i32) -> u8 {
        let mut s = self.shared.lock();
        let target = i32::from(s.volume).saturating_add(delta);
        set_volume_locked(&mut s, target)
    }

    /// Mute, or restore the volume from before the last mute.
    pub fn toggle_mute(&self) -> u8 {
        let mut s = self.shared.lock();
        let v = match s.unmuted_volume.take() {
            Some(previous) => previous,
            None => {
                s.unmuted_volume = Some(s.volume);
                0
            }
        };
        apply_volume(&mut s, v);
        v
    }

    pub fn volume_step(&self) -> u8 {
        self.shared.settings.volume_step
    }

    pub fn set_auto_advance(&self, enabled: bool) {
        self.shared.lock().auto_advance = enabled;
    }

    pub fn auto_advance(&self) -> bool {
        self.shared.lock().auto_advance
    }

    pub fn transport(&self) -> TransportState {
        self.shared.lock().transport
    }

    pub fn current_track(&self) -> Option<TrackDescriptor> {
        self.shared.lock().current.clone()
    }

    pub fn progress(&self) -> ProgressSnapshot {
        let s = self.shared.lock();
        ProgressSnapshot {
            position: s.position_secs,
            duration: s.duration_secs,
            transport: s.transport,
            volume: s.volume,
        }
    }

    /// True while a poller thread for this session is alive.
    #[cfg(test)]
    pub fn poller_running(&self) -> bool {
        self.shared.lock().poller_alive
    }
}

fn set_volume_locked<B: Backend>(s: &mut Session<B>, volume: i32) -> u8 {
    let v = volume.clamp(0, 100) as u8;
    apply_volume(s, v);
    if v > 0 {
        s.unmuted_volume = None;
    }
    v
}

fn apply_volume<B: Backend>(s: &mut Session<B>, volume: u8) {
    s.volume = volume;
    if let Err(e) = s.backend.set_volume(volume) {
        warn!("backend volume change failed: {e}");
    }
}
