use thiserror::Error;

use crate::audio::BackendError;

/// Recoverable conditions reported by the queue and the session controller.
///
/// Front ends surface these as messages; none of them end the process.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("not signed in to a catalog")]
    NotAuthenticated,
    #[error("no stream available for \"{0}\"")]
    StreamUnavailable(String),
    #[error("end of queue reached")]
    EndOfQueue,
    #[error("already at the first track")]
    AtStart,
    #[error("track {index} is out of range (queue holds {len})")]
    OutOfRange { index: usize, len: usize },
    #[error("no track is playing")]
    NoActiveTrack,
    #[error(transparent)]
    Backend(#[from] BackendError),
}
