use std::time::Duration;

use crate::audio::BackendState;
use crate::config::PlaybackSettings;

/// Transport state owned by the session controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Point-in-time view of playback for display layers.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ProgressSnapshot {
    /// Seconds elapsed in the current track.
    pub position: f64,
    /// Track length in seconds.
    pub duration: f64,
    pub transport: TransportState,
    /// 0-100.
    pub volume: u8,
}

/// Timings and defaults the controller runs with.
#[derive(Clone, Debug)]
pub struct ControllerSettings {
    pub poll_interval: Duration,
    pub advance_delay: Duration,
    pub auto_advance: bool,
    pub volume: u8,
    /// Change applied by one volume up/down key press.
    pub volume_step: u8,
}

impl From<&PlaybackSettings> for ControllerSettings {
    fn from(s: &PlaybackSettings) -> Self {
        Self {
            poll_interval: Duration::from_millis(s.poll_interval_ms.max(1)),
            advance_delay: Duration::from_millis(s.advance_delay_ms),
            auto_advance: s.auto_advance,
            volume: s.volume.min(100),
            volume_step: s.volume_step,
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&PlaybackSettings::default())
    }
}

/// One-shot latch on the backend's "ended" state.
///
/// Fires once when the backend enters `Ended`, stays quiet while it keeps
/// reporting `Ended`, and re-arms as soon as it reports anything else or a
/// new track is loaded.
#[derive(Debug, Default)]
pub struct EndLatch {
    fired: bool,
}

impl EndLatch {
    /// Feed one observed backend state; returns true only on the firing edge.
    pub fn observe(&mut self, state: BackendState) -> bool {
        if state != BackendState::Ended {
            self.fired = false;
            return false;
        }
        if self.fired {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn reset(&mut self) {
        self.fired = false;
    }
}
