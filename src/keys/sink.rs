use log::{info, warn};

use crate::audio::Backend;
use crate::playback::{PlaybackError, SessionController};
use crate::remote::{Automation, DesktopBridge};

use super::MediaKey;

/// Receiver of debounced logical commands.
pub trait CommandSink: Send + Sync {
    fn dispatch(&self, key: MediaKey);
}

impl<B: Backend + 'static> CommandSink for SessionController<B> {
    fn dispatch(&self, key: MediaKey) {
        let step = i32::from(self.volume_step());
        let result = match key {
            MediaKey::PlayPause => self.pause_resume().map(|_| ()),
            MediaKey::Next => self.next().map(|_| ()),
            MediaKey::Previous => self.previous().map(|_| ()),
            MediaKey::VolumeUp => {
                self.adjust_volume(step);
                Ok(())
            }
            MediaKey::VolumeDown => {
                self.adjust_volume(-step);
                Ok(())
            }
            MediaKey::Mute => {
                self.toggle_mute();
                Ok(())
            }
        };
        match result {
            Ok(()) => {}
            Err(
                e @ (PlaybackError::EndOfQueue
                | PlaybackError::AtStart
                | PlaybackError::NoActiveTrack),
            ) => {
                info!("{key:?}: {e}")
            }
            Err(e) => warn!("{key:?} failed: {e}"),
        }
    }
}

impl<A: Automation> CommandSink for DesktopBridge<A> {
    fn dispatch(&self, key: MediaKey) {
        self.send_logged(key.into());
    }
}
