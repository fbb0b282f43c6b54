//! Utilities for creating `rodio` sinks from local media paths.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` ready to be started by the engine thread.

use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::BackendError;

/// Strip a `file://` scheme so local URIs and plain paths both work.
pub(super) fn uri_to_path(uri: &str) -> &str {
    uri.strip_prefix("file://").unwrap_or(uri)
}

/// Create a paused `Sink` for `path`, returning it with the decoded length when known.
pub(super) fn create_sink(
    stream: &OutputStream,
    path: &str,
) -> Result<(Sink, Option<Duration>), BackendError> {
    let load_err = |reason: String| BackendError::Load {
        uri: path.to_string(),
        reason,
    };

    let file = File::open(path).map_err(|e| load_err(e.to_string()))?;
    let source = Decoder::new(BufReader::new(file)).map_err(|e| load_err(e.to_string()))?;
    let length = source.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.pause();
    sink.append(source);
    Ok((sink, length))
}
