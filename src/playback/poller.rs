//! Background poller driving end-of-track detection and auto-advance.

use std::sync::Arc;
use std::thread;

use log::{debug, info, warn};

use crate::audio::{Backend, BackendError};

use super::controller::{Shared, Tick, play_locked};
use super::error::PlaybackError;
use super::types::TransportState;

/// Spawn the poller. The caller has already marked it alive under the lock.
pub(super) fn spawn<B: Backend + 'static>(shared: Arc<Shared<B>>) {
    thread::spawn(move || run(&shared));
}

fn run<B: Backend + 'static>(shared: &Arc<Shared<B>>) {
    debug!("poller started");
    loop {
        thread::sleep(shared.settings.poll_interval);

        let pending = {
            let mut s = shared.lock();
            match s.tick() {
                Tick::Idle => None,
                Tick::Advance(generation) => Some(generation),
                Tick::Exit => {
                    s.poller_alive = false;
                    debug!("poller exiting");
                    return;
                }
            }
        };

        if let Some(generation) = pending {
            thread::sleep(shared.settings.advance_delay);
            advance_after_end(shared, generation);
        }
    }
}

/// Play the next playable queue entry, skipping tracks that cannot be opened.
///
/// Does nothing when a play or stop happened since the end was detected. A
/// pause during the delay wins; the end is detected again after resuming.
pub(super) fn advance_after_end<B: Backend + 'static>(shared: &Arc<Shared<B>>, generation: u64) {
    let mut s = shared.lock();
    if s.generation() != generation || s.transport() == TransportState::Stopped {
        debug!("auto-advance superseded");
        return;
    }
    if s.transport() == TransportState::Paused {
        debug!("paused before auto-advance");
        s.rearm_end();
        return;
    }

    loop {
        let next = match s.queue_advance() {
            Some(track) => track,
            None => {
                info!("end of queue reached");
                s.finish();
                return;
            }
        };

        match play_locked(shared, &mut s, next) {
            Ok(()) => return,
            Err(PlaybackError::StreamUnavailable(title)) => {
                warn!("skipping \"{title}\": no stream available");
            }
            Err(PlaybackError::Backend(e @ BackendError::Load { .. })) => {
                warn!("skipping track: {e}");
            }
            Err(e) => {
                warn!("auto-advance failed: {e}");
                return;
            }
        }
    }
}
