//! Media key input.
//!
//! Raw key signals are mapped to a [`MediaKey`], debounced per key and
//! handed to a [`CommandSink`], either the local session controller or the
//! desktop bridge. The mini player forwards accepted keys itself.

mod capture;
mod debouncer;
mod mpris;
mod sink;

use serde::Serialize;
use thiserror::Error;

pub use capture::{CaptureBackend, KeyCapture, StartOutcome, StopOutcome};
pub use debouncer::{Debouncer, KeyStats};
pub use mpris::MprisCapture;
pub use sink::CommandSink;

/// Logical command, independent of where the key press came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKey {
    PlayPause,
    Next,
    Previous,
    VolumeUp,
    VolumeDown,
    Mute,
}

/// Key signal as delivered by an input source.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RawKey {
    /// Virtual key code of a hardware media key.
    Code(u32),
    /// Character typed in a terminal front end.
    Char(char),
}

pub const VK_MUTE: u32 = 173;
pub const VK_VOLUME_DOWN: u32 = 174;
pub const VK_VOLUME_UP: u32 = 175;
pub const VK_NEXT: u32 = 176;
pub const VK_PREVIOUS: u32 = 177;
pub const VK_PLAY_PAUSE: u32 = 179;

/// The fixed raw key map. Anything not listed is ignored.
pub fn logical_key(raw: RawKey) -> Option<MediaKey> {
    match raw {
        RawKey::Code(VK_PLAY_PAUSE) | RawKey::Char(' ') => Some(MediaKey::PlayPause),
        RawKey::Code(VK_NEXT) | RawKey::Char('n') => Some(MediaKey::Next),
        RawKey::Code(VK_PREVIOUS) | RawKey::Char('p') => Some(MediaKey::Previous),
        RawKey::Code(VK_VOLUME_UP) | RawKey::Char('+' | '=') => Some(MediaKey::VolumeUp),
        RawKey::Code(VK_VOLUME_DOWN) | RawKey::Char('-') => Some(MediaKey::VolumeDown),
        RawKey::Code(VK_MUTE) | RawKey::Char('m') => Some(MediaKey::Mute),
        _ => None,
    }
}

#[derive(Debug, Error)]
pub enum KeyError {
    /// The OS refused key capture; the rest of the program keeps running.
    #[error("media key capture unavailable: {0}")]
    StartupFailure(String),
}
