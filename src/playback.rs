//! Playback session: queue, transport state and auto-advance.
//!
//! [`SessionController`] is the only owner of the backend and the queue.
//! A background poller samples the backend while a track plays and moves
//! on to the next queue entry once the backend reports the track ended.

mod controller;
mod error;
mod poller;
mod queue;
mod types;

pub use controller::SessionController;
pub use error::PlaybackError;
pub use queue::Queue;
pub use types::{ControllerSettings, EndLatch, ProgressSnapshot, TransportState};

#[cfg(test)]
mod tests;
