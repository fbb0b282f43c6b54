//! Track catalog: descriptors, the catalog interface and a local-library
//! implementation built from a scanned music directory.

mod model;
mod scan;

use std::collections::BTreeMap;
use std::path::Path;

use log::info;
use thiserror::Error;

use crate::config::LibrarySettings;

pub use model::{LocalFile, StreamResolver, TrackDescriptor, TrackId};
pub use scan::scan;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no artist matches \"{0}\"")]
    ArtistNotFound(String),
    #[error("no album matches \"{0}\"")]
    AlbumNotFound(String),
    #[error("library directory does not exist: {0}")]
    MissingDirectory(String),
}

/// Source of playable tracks for the front ends.
pub trait Catalog {
    /// Tracks matching a free-text query, best matches first.
    fn search(&self, query: &str) -> Vec<TrackDescriptor>;
    /// Tracks of the first artist matching `artist`, at most `limit` of them.
    fn artist_radio(
        &self,
        artist: &str,
        limit: usize,
    ) -> Result<Vec<TrackDescriptor>, CatalogError>;
    /// Tracks of the first album matching `query`, in album order.
    fn album(&self, query: &str) -> Result<Vec<TrackDescriptor>, CatalogError>;
}

/// Catalog backed by the audio files found under a directory.
pub struct LibraryCatalog {
    tracks: Vec<TrackDescriptor>,
}

impl LibraryCatalog {
    pub fn open(dir: &Path, settings: &LibrarySettings) -> Result<Self, CatalogError> {
        if !dir.is_dir() {
            return Err(CatalogError::MissingDirectory(dir.display().to_string()));
        }
        let tracks = scan(dir, settings);
        info!("library {}: {} tracks", dir.display(), tracks.len());
        Ok(Self::from_tracks(tracks))
    }

    pub fn from_tracks(tracks: Vec<TrackDescriptor>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

impl Catalog for LibraryCatalog {
    fn search(&self, query: &str) -> Vec<TrackDescriptor> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return Vec::new();
        }

        // Rank: title hits, then artist hits, then album hits.
        let mut ranked: Vec<(u8, &TrackDescriptor)> = self
            .tracks
            .iter()
            .filter_map(|t| {
                if contains_ci(t.title(), &q) {
                    Some((0, t))
                } else if contains_ci(t.artist(), &q) {
                    Some((1, t))
                } else if contains_ci(t.album(), &q) {
                    Some((2, t))
                } else {
                    None
                }
            })
            .collect();
        ranked.sort_by_key(|(rank, _)| *rank);
        ranked.into_iter().map(|(_, t)| t.clone()).collect()
    }

    fn artist_radio(
        &self,
        artist: &str,
        limit: usize,
    ) -> Result<Vec<TrackDescriptor>, CatalogError> {
        let q = artist.trim().to_lowercase();
        let name = self
            .tracks
            .iter()
            .map(|t| t.artist())
            .find(|a| !q.is_empty() && contains_ci(a, &q))
            .ok_or_else(|| CatalogError::ArtistNotFound(artist.to_string()))?;

        Ok(self
            .tracks
            .iter()
            .filter(|t| t.artist() == name)
            .take(limit)
            .cloned()
            .collect())
    }

    fn album(&self, query: &str) -> Result<Vec<TrackDescriptor>, CatalogError> {
        let q = query.trim().to_lowercase();
        let album = self
            .tracks
            .iter()
            .find(|t| !q.is_empty() && contains_ci(t.album(), &q))
            .map(|t| (t.album().to_string(), t.artist().to_string()))
            .ok_or_else(|| CatalogError::AlbumNotFound(query.to_string()))?;

        // Same album name and artist; order by file path so numbered files keep their order.
        let by_id: BTreeMap<&TrackId, &TrackDescriptor> = self
            .tracks
            .iter()
            .filter(|t| t.album() == album.0 && t.artist() == album.1)
            .map(|t| (t.id(), t))
            .collect();
        Ok(by_id.into_values().cloned().collect())
    }
}
