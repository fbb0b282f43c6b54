use std::path::{Path, PathBuf};
use std::sync::Arc;

use lofty::prelude::*;
use log::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{LocalFile, TrackDescriptor, TrackId};

pub(super) const UNKNOWN_ARTIST: &str = "Unknown";
pub(super) const UNKNOWN_ALBUM: &str = "Unknown";

const COVER_STEMS: [&str; 3] = ["cover", "folder", "front"];
const COVER_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Look for `cover.jpg`, `folder.png` and friends next to `path`.
fn find_artwork(path: &Path) -> Option<PathBuf> {
    let dir = path.parent()?;
    COVER_STEMS
        .iter()
        .flat_map(|stem| {
            COVER_EXTENSIONS
                .iter()
                .map(move |ext| dir.join(format!("{stem}.{ext}")))
        })
        .find(|candidate| candidate.is_file())
}

fn non_empty(value: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Walk `dir` and build a descriptor for every audio file found.
///
/// Files whose tags cannot be read still show up, titled after their file
/// stem. The result is sorted by `Artist - Title`, case-insensitively.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<TrackDescriptor> {
    let mut tracks: Vec<TrackDescriptor> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);
    if let Some(d) = settings.max_depth {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }

        let mut title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        let mut artist = UNKNOWN_ARTIST.to_string();
        let mut album = UNKNOWN_ALBUM.to_string();
        let mut duration_secs = 0;

        match lofty::read_from_path(path) {
            Ok(tagged) => {
                duration_secs = tagged.properties().duration().as_secs();

                if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                    if let Some(v) = non_empty(tag.title()) {
                        title = v;
                    }
                    if let Some(v) = non_empty(tag.artist()) {
                        artist = v;
                    }
                    if let Some(v) = non_empty(tag.album()) {
                        album = v;
                    }
                }
            }
            Err(e) => debug!("no readable tags in {}: {e}", path.display()),
        }

        let id = TrackId::new(path.to_string_lossy());
        let track = TrackDescriptor::new(
            id,
            title,
            artist,
            album,
            duration_secs,
            Arc::new(LocalFile(path.to_path_buf())),
        )
        .with_artwork(find_artwork(path));

        tracks.push(track);
    }

    tracks.sort_by(|a, b| {
        a.display()
            .to_lowercase()
            .cmp(&b.display().to_lowercase())
            .then_with(|| a.id().cmp(b.id()))
    });
    tracks
}
