//! Remote control bridge.
//!
//! Two transports keep this process and an external player in step:
//! [`DesktopBridge`] pushes blind keyboard shortcuts into a desktop app,
//! [`SyncClient`] mirrors the state a remote player publishes over a
//! websocket and forwards commands back over the same connection.

mod automation;
mod error;
mod message;
mod push;
mod snapshot;
mod sync;

pub use automation::{Automation, Modifier, OsaScript};
pub use error::{BridgeError, SyncError};
pub use message::{Inbound, Outbound, TrackUpdate};
pub use push::{Command, DesktopBridge};
pub use snapshot::NowPlaying;
pub use sync::{ConnectionState, SyncClient, SyncSettings};
