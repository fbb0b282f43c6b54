use std::time::Instant;

use crate::playback::{ProgressSnapshot, TransportState};

use super::message::TrackUpdate;

/// Upper bound for reported times, in seconds.
pub const MAX_SECS: f64 = u32::MAX as f64;

/// Non-finite values become 0; the rest are clamped to `[0, MAX_SECS]`.
fn seconds(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, MAX_SECS)
    } else {
        0.0
    }
}

/// Last state received from the remote player, stamped with its arrival time.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub is_playing: bool,
    /// Position reported by the remote, in seconds.
    pub position: f64,
    pub duration: f64,
    pub volume: u8,
    pub received_at: Instant,
}

impl NowPlaying {
    pub fn from_update(update: TrackUpdate, received_at: Instant) -> Self {
        Self {
            title: update.title,
            artist: update.artist,
            album: update.album,
            is_playing: update.is_playing,
            position: seconds(update.position),
            duration: seconds(update.duration),
            volume: update.volume.clamp(0.0, 100.0).round() as u8,
            received_at,
        }
    }

    /// Position at `now`, advanced by wall-clock time while playing and
    /// capped at the reported duration.
    pub fn position_at(&self, now: Instant) -> f64 {
        if !self.is_playing {
            return self.position;
        }
        let elapsed = now.saturating_duration_since(self.received_at).as_secs_f64();
        let position = (self.position + elapsed).min(MAX_SECS);
        if self.duration > 0.0 {
            position.min(self.duration)
        } else {
            position
        }
    }

    pub fn progress_at(&self, now: Instant) -> ProgressSnapshot {
        ProgressSnapshot {
            position: self.position_at(now),
            duration: self.duration,
            transport: if self.is_playing {
                TransportState::Playing
            } else {
                TransportState::Paused
            },
            volume: self.volume,
        }
    }
}
