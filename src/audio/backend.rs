use super::types::{BackendError, BackendState};

/// Transport primitives of an opaque local media engine.
///
/// The session controller owns exactly one backend and drives it only
/// through these calls.
pub trait Backend: Send {
    /// Load `uri`, replacing whatever was loaded before. Does not start playback.
    fn load(&mut self, uri: &str) -> Result<(), BackendError>;
    fn play(&mut self) -> Result<(), BackendError>;
    fn pause(&mut self) -> Result<(), BackendError>;
    /// Stop and unload. A no-op when nothing is loaded.
    fn stop(&mut self) -> Result<(), BackendError>;
    /// Output volume, 0-100.
    fn set_volume(&mut self, volume: u8) -> Result<(), BackendError>;
    /// Fraction of the media played, in `[0.0, 1.0]`, or negative when unknown.
    fn position(&self) -> f64;
    /// Media length in milliseconds, or `<= 0` when unknown.
    fn length(&self) -> i64;
    fn state(&self) -> BackendState;
}
