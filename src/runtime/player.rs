//! Line-oriented player: reads commands from stdin and drives a local
//! session controller.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::audio::{Backend, RodioBackend};
use crate::config::Settings;
use crate::keys::{Debouncer, KeyCapture, MprisCapture};
use crate::library::{Catalog, LibraryCatalog, TrackDescriptor};
use crate::playback::{
    ControllerSettings, PlaybackError, ProgressSnapshot, SessionController, TransportState,
};

pub const HELP: &str = "\
commands:
  search <query>   search the library
  play <n>         play result n of the last search (queues all results)
  pause            pause / resume
  stop             stop playback
  vol <0-100>      set volume
  next, prev       move through the queue
  playlist         show the queue
  radio <artist>   queue tracks by an artist
  album <query>    queue an album
  now              show what is playing
  auto [on|off]    show or set auto-advance
  help             this text
  quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Search(String),
    /// 1-based index into the last search results.
    Play(usize),
    Pause,
    Stop,
    Volume(i32),
    Next,
    Prev,
    Playlist,
    Radio(String),
    Album(String),
    Now,
    /// `None` reports the current setting.
    Auto(Option<bool>),
    Help,
    Quit,
}

/// Parse one input line. `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<CliCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let need_arg = |what: &str| -> Result<String, String> {
        if rest.is_empty() {
            Err(format!("usage: {word} <{what}>"))
        } else {
            Ok(rest.to_string())
        }
    };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "search" | "s" => CliCommand::Search(need_arg("query")?),
        "play" | "p" => {
            let n: usize = need_arg("n")?
                .parse()
                .map_err(|_| format!("not a track number: {rest}"))?;
            if n == 0 {
                return Err("track numbers start at 1".to_string());
            }
            CliCommand::Play(n)
        }
        "pause" => CliCommand::Pause,
        "stop" => CliCommand::Stop,
        "vol" | "volume" => CliCommand::Volume(
            need_arg("0-100")?
                .parse()
                .map_err(|_| format!("not a volume: {rest}"))?,
        ),
        "next" | "n" => CliCommand::Next,
        "prev" | "previous" => CliCommand::Prev,
        "playlist" | "queue" => CliCommand::Playlist,
        "radio" => CliCommand::Radio(need_arg("artist")?),
        "album" => CliCommand::Album(need_arg("query")?),
        "now" => CliCommand::Now,
        "auto" => match rest {
            "" => CliCommand::Auto(None),
            "on" => CliCommand::Auto(Some(true)),
            "off" => CliCommand::Auto(Some(false)),
            _ => return Err("usage: auto on|off".to_string()),
        },
        "help" | "?" => CliCommand::Help,
        "quit" | "exit" | "q" => CliCommand::Quit,
        other => return Err(format!("unknown command: {other} (try help)")),
    };
    Ok(Some(cmd))
}

fn mmss(secs: f64) -> String {
    let secs = secs.max(0.0) as u64;
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// One-line summary of the current track, e.g. `Artist - Title [Playing] 1:05 / 3:20 vol 70`.
pub fn format_now(track: Option<&TrackDescriptor>, progress: &ProgressSnapshot) -> String {
    let Some(track) = track else {
        return format!("nothing playing (vol {})", progress.volume);
    };
    let state = match progress.transport {
        TransportState::Playing => "Playing",
        TransportState::Paused => "Paused",
        TransportState::Stopped => "Stopped",
    };
    format!(
        "{} [{}] {} / {} vol {}",
        track.display(),
        state,
        mmss(progress.position),
        mmss(progress.duration),
        progress.volume
    )
}

fn list_line(n: usize, track: &TrackDescriptor) -> String {
    format!(
        "{n:>3}. {} ({}) {}",
        track.display(),
        track.album(),
        mmss(track.duration_secs() as f64)
    )
}

/// Front-end state around one session controller.
pub struct PlayerSession<C: Catalog, B: Backend + 'static> {
    controller: SessionController<B>,
    catalog: Option<C>,
    last_results: Vec<TrackDescriptor>,
    radio_limit: usize,
}

impl<C: Catalog, B: Backend + 'static> PlayerSession<C, B> {
    pub fn new(controller: SessionController<B>, catalog: Option<C>, radio_limit: usize) -> Self {
        Self {
            controller,
            catalog,
            last_results: Vec::new(),
            radio_limit,
        }
    }

    fn catalog(&self) -> Result<&C, PlaybackError> {
        self.catalog.as_ref().ok_or(PlaybackError::NotAuthenticated)
    }

    /// Replace the queue and start its first track.
    fn queue_and_play(&self, tracks: Vec<TrackDescriptor>, out: &mut impl Write) -> io::Result<()> {
        for (i, t) in tracks.iter().enumerate() {
            writeln!(out, "{}", list_line(i + 1, t))?;
        }
        self.controller.replace_queue(tracks);
        match self.controller.play_index(0) {
            Ok(t) => writeln!(out, "playing {}", t.display()),
            Err(e) => writeln!(out, "{e}"),
        }
    }

    /// Run one command; returns false when the user asked to quit.
    pub fn execute(&mut self, cmd: CliCommand, out: &mut impl Write) -> io::Result<bool> {
        match cmd {
            CliCommand::Search(query) => match self.catalog() {
                Ok(catalog) => {
                    let results = catalog.search(&query);
                    if results.is_empty() {
                        writeln!(out, "no results for \"{query}\"")?;
                    }
                    for (i, t) in results.iter().enumerate() {
                        writeln!(out, "{}", list_line(i + 1, t))?;
                    }
                    self.last_results = results;
                }
                Err(e) => writeln!(out, "{e}")?,
            },
            CliCommand::Play(n) => {
                if n > self.last_results.len() {
                    let e = PlaybackError::OutOfRange {
                        index: n,
                        len: self.last_results.len(),
                    };
                    writeln!(out, "{e}")?;
                } else {
                    self.controller.replace_queue(self.last_results.clone());
                    match self.controller.play_index(n - 1) {
                        Ok(t) => writeln!(out, "playing {}", t.display())?,
                        Err(e) => writeln!(out, "{e}")?,
                    }
                }
            }
            CliCommand::Pause => match self.controller.pause_resume() {
                Ok(TransportState::Paused) => writeln!(out, "paused")?,
                Ok(_) => writeln!(out, "resumed")?,
                Err(e) => writeln!(out, "{e}")?,
            },
            CliCommand::Stop => {
                if self.controller.transport() == TransportState::Stopped {
                    writeln!(out, "already stopped")?;
                } else {
                    self.controller.stop();
                    writeln!(out, "stopped")?;
                }
            }
            CliCommand::Volume(v) => {
                let applied = self.controller.set_volume(v);
                writeln!(out, "volume {applied}")?;
            }
            CliCommand::Next => match self.controller.next() {
                Ok(t) => writeln!(out, "playing {}", t.display())?,
                Err(e) => writeln!(out, "{e}")?,
            },
            CliCommand::Prev => match self.controller.previous() {
                Ok(t) => writeln!(out, "playing {}", t.display())?,
                Err(e) => writeln!(out, "{e}")?,
            },
            CliCommand::Playlist => {
                let (tracks, cursor) = self.controller.queue();
                if tracks.is_empty() {
                    writeln!(out, "queue is empty")?;
                }
                for (i, t) in tracks.iter().enumerate() {
                    let marker = if i == cursor { ">" } else { " " };
                    writeln!(out, "{marker}{}", list_line(i + 1, t))?;
                }
            }
            CliCommand::Radio(artist) => {
                let tracks = self
                    .catalog()
                    .map_err(|e| e.to_string())
                    .and_then(|c| {
                        c.artist_radio(&artist, self.radio_limit)
                            .map_err(|e| e.to_string())
                    });
                match tracks {
                    Ok(tracks) => self.queue_and_play(tracks, out)?,
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
            CliCommand::Album(query) => {
                let tracks = self
                    .catalog()
                    .map_err(|e| e.to_string())
                    .and_then(|c| c.album(&query).map_err(|e| e.to_string()));
                match tracks {
                    Ok(tracks) => self.queue_and_play(tracks, out)?,
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
            CliCommand::Now => {
                let current = self.controller.current_track();
                writeln!(out, "{}", format_now(current.as_ref(), &self.controller.progress()))?;
                match &current {
                    Some(track) => {
                        if let Some(art) = track.artwork() {
                            writeln!(out, "cover: {}", art.display())?;
                        }
                    }
                    None => {
                        if let Some(next) = self.controller.queue_current() {
                            writeln!(out, "queued: {}", next.display())?;
                        }
                    }
                }
            }
            CliCommand::Auto(setting) => {
                if let Some(on) = setting {
                    self.controller.set_auto_advance(on);
                }
                let on = self.controller.auto_advance();
                writeln!(out, "auto-advance {}", if on { "on" } else { "off" })?;
            }
            CliCommand::Help => writeln!(out, "{HELP}")?,
            CliCommand::Quit => return Ok(false),
        }
        Ok(true)
    }
}

fn music_dir(arg: Option<String>, settings: &Settings) -> PathBuf {
    arg.or_else(|| settings.library.dir.clone())
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("Music"))
}

fn start_key_capture<B: Backend + 'static>(
    settings: &Settings,
    controller: &SessionController<B>,
) -> Option<KeyCapture<MprisCapture>> {
    if !settings.keys.mpris {
        return None;
    }
    let debouncer = Debouncer::new(Duration::from_millis(settings.keys.debounce_ms))
        .with_sink(Arc::new(controller.clone()));
    let mut capture = KeyCapture::new(MprisCapture::new(), debouncer);
    match capture.start() {
        Ok(_) => Some(capture),
        Err(e) => {
            warn!("{e}; continuing without media keys");
            None
        }
    }
}

pub fn run(settings: &Settings, dir: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let dir = music_dir(dir, settings);
    let catalog = match LibraryCatalog::open(&dir, &settings.library) {
        Ok(c) if c.is_empty() => {
            warn!("no audio files under {}", dir.display());
            Some(c)
        }
        Ok(c) => Some(c),
        Err(e) => {
            warn!("{e}");
            None
        }
    };

    let backend = RodioBackend::spawn()?;
    let controller = SessionController::new(backend, ControllerSettings::from(&settings.playback));
    let capture = start_key_capture(settings, &controller);

    let mut session = PlayerSession::new(controller.clone(), catalog, settings.library.radio_limit);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let tracks = session.catalog.as_ref().map_or(0, LibraryCatalog::len);
    writeln!(out, "incallide: {} tracks in {} (type help for commands)", tracks, dir.display())?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        match parse_command(&line?) {
            Ok(Some(cmd)) => {
                if !session.execute(cmd, &mut out)? {
                    break;
                }
            }
            Ok(None) => {}
            Err(msg) => writeln!(out, "{msg}")?,
        }
    }

    controller.stop();
    if let Some(capture) = &capture {
        info!("media keys handled: {}", capture.stats().accepted);
    }
    Ok(())
}
