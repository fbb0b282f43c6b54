use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;

use super::sink::CommandSink;
use super::{MediaKey, RawKey, logical_key};

type Callback = Box<dyn FnMut(MediaKey) + Send>;

/// Counters kept since the debouncer was created.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct KeyStats {
    /// Mapped key events seen, repeats included.
    pub pressed: u64,
    /// Events that survived the debounce window.
    pub accepted: u64,
}

/// Drops repeats of the same logical key inside a fixed window.
pub struct Debouncer {
    window: Duration,
    /// Last accepted occurrence per logical key.
    last_accepted: HashMap<MediaKey, Instant>,
    callbacks: HashMap<MediaKey, Vec<Callback>>,
    sink: Option<Arc<dyn CommandSink>>,
    stats: KeyStats,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: HashMap::new(),
            callbacks: HashMap::new(),
            sink: None,
            stats: KeyStats::default(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn CommandSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Run `callback` for every accepted press of `key`, before the sink sees it.
    pub fn on_key(&mut self, key: MediaKey, callback: impl FnMut(MediaKey) + Send + 'static) {
        self.callbacks.entry(key).or_default().push(Box::new(callback));
    }

    pub fn handle(&mut self, raw: RawKey) -> Option<MediaKey> {
        self.handle_at(raw, Instant::now())
    }

    /// Handle `raw` as if it arrived at `now`; returns the key when accepted.
    pub fn handle_at(&mut self, raw: RawKey, now: Instant) -> Option<MediaKey> {
        let Some(key) = logical_key(raw) else {
            debug!("ignoring unmapped key {raw:?}");
            return None;
        };
        self.stats.pressed += 1;

        if let Some(last) = self.last_accepted.get(&key) {
            if now.saturating_duration_since(*last) < self.window {
                debug!("debounced {key:?}");
                return None;
            }
        }

        self.last_accepted.insert(key, now);
        self.stats.accepted += 1;

        if let Some(callbacks) = self.callbacks.get_mut(&key) {
            for callback in callbacks.iter_mut() {
                callback(key);
            }
        }
        if let Some(sink) = &self.sink {
            sink.dispatch(key);
        }
        Some(key)
    }

    pub fn stats(&self) -> KeyStats {
        self.stats
    }
}
