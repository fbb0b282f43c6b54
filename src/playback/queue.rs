//! Ordered play queue with a cursor.
//!
//! Pure navigation over track descriptors; resolving a track to a stream is
//! the caller's job and happens at play time.

use crate::library::TrackDescriptor;

use super::error::PlaybackError;

#[derive(Debug, Default)]
pub struct Queue {
    tracks: Vec<TrackDescriptor>,
    cursor: usize,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a whole new track list; the cursor goes back to the start.
    pub fn replace(&mut self, tracks: Vec<TrackDescriptor>) {
        self.tracks = tracks;
        self.cursor = 0;
    }

    /// Track under the cursor, `None` when the queue is empty.
    pub fn current(&self) -> Option<&TrackDescriptor> {
        self.tracks.get(self.cursor)
    }

    pub fn advance(&mut self) -> Result<&TrackDescriptor, PlaybackError> {
        if self.cursor + 1 >= self.tracks.len() {
            return Err(PlaybackError::EndOfQueue);
        }
        self.cursor += 1;
        Ok(&self.tracks[self.cursor])
    }

    pub fn retreat(&mut self) -> Result<&TrackDescriptor, PlaybackError> {
        if self.cursor == 0 || self.tracks.is_empty() {
            return Err(PlaybackError::AtStart);
        }
        self.cursor -= 1;
        Ok(&self.tracks[self.cursor])
    }

    pub fn jump_to(&mut self, index: usize) -> Result<&TrackDescriptor, PlaybackError> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::OutOfRange {
                index,
                len: self.tracks.len(),
            });
        }
        self.cursor = index;
        Ok(&self.tracks[index])
    }

    /// Cursor position; meaningless while the queue is empty.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True when the cursor sits on the final element (or the queue is empty).
    pub fn is_at_end(&self) -> bool {
        self.cursor + 1 >= self.tracks.len()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[TrackDescriptor] {
        &self.tracks
    }
}
