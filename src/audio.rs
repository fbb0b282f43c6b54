//! Audio subsystem.
//!
//! The playback engine is reached only through the [`Backend`] trait. The
//! shipped implementation, [`RodioBackend`], keeps the `rodio` output
//! stream on a dedicated thread and exposes it through a command channel
//! plus a status snapshot refreshed every tick.

mod backend;
mod player;
mod sink;
mod thread;
mod types;

pub use backend::Backend;
pub use player::RodioBackend;
pub use types::{BackendError, BackendState};
