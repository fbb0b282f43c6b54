use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lazily turns a track into something the backend can load.
///
/// Resolution happens at play time, never while a queue is built.
pub trait StreamResolver: Send + Sync {
    /// Returns the playable URI, or `None` when the stream is unavailable.
    fn resolve(&self) -> Option<String>;
}

/// A track stored on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFile(pub PathBuf);

impl StreamResolver for LocalFile {
    fn resolve(&self) -> Option<String> {
        if self.0.is_file() {
            self.0.to_str().map(str::to_string)
        } else {
            None
        }
    }
}

/// Stable identity of a track; two recordings sharing title and artist differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable description of one playable track.
#[derive(Clone)]
pub struct TrackDescriptor {
    id: TrackId,
    title: String,
    artist: String,
    album: String,
    duration_secs: u64,
    artwork: Option<PathBuf>,
    stream: Arc<dyn StreamResolver>,
}

impl TrackDescriptor {
    pub fn new(
        id: TrackId,
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        duration_secs: u64,
        stream: Arc<dyn StreamResolver>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            duration_secs,
            artwork: None,
            stream,
        }
    }

    /// Attach a cover image reference.
    pub fn with_artwork(mut self, artwork: Option<PathBuf>) -> Self {
        self.artwork = artwork;
        self
    }

    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    /// Cover image for the track, if one was found.
    pub fn artwork(&self) -> Option<&Path> {
        self.artwork.as_deref()
    }

    /// Resolve the stream handle to a URI the backend can load.
    pub fn resolve_stream(&self) -> Option<String> {
        self.stream.resolve()
    }

    /// True when both descriptors refer to the same track.
    pub fn is_same(&self, other: &TrackDescriptor) -> bool {
        self.id == other.id
    }

    /// `Artist - Title`, or just the title when the artist is unknown.
    pub fn display(&self) -> String {
        if self.artist.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.artist.trim(), self.title)
        }
    }
}

impl fmt::Debug for TrackDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackDescriptor")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("artist", &self.artist)
            .field("album", &self.album)
            .field("duration_secs", &self.duration_secs)
            .finish_non_exhaustive()
    }
}

impl PartialEq for TrackDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl Eq for TrackDescriptor {}
