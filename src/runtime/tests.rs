use super::companion::{Console, parse_console};
use super::player::{CliCommand, PlayerSession, format_now, parse_command};
use super::settings::resolve;
use super::{Mode, parse_args};
use crate::audio::{Backend, BackendError, BackendState};
use crate::config::Settings;
use crate::library::{LibraryCatalog, StreamResolver, TrackDescriptor, TrackId};
use crate::playback::{ControllerSettings, ProgressSnapshot, SessionController, TransportState};
use std::sync::Arc;
use std::time::Duration;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn parses_front_end_modes() {
    assert_eq!(parse_args(&[]), Ok(Mode::Play(None)));
    assert_eq!(
        parse_args(&args(&["play", "/srv/music"])),
        Ok(Mode::Play(Some("/srv/music".into())))
    );
    assert_eq!(parse_args(&args(&["~/Music"])), Ok(Mode::Play(Some("~/Music".into()))));
    assert_eq!(parse_args(&args(&["mini"])), Ok(Mode::Mini));
    assert_eq!(
        parse_args(&args(&["keys", "--auto-launch"])),
        Ok(Mode::Keys { auto_launch: true })
    );
    assert_eq!(parse_args(&args(&["--help"])), Ok(Mode::Help));
}

#[test]
fn rejects_unknown_arguments() {
    assert!(parse_args(&args(&["--verbose"])).is_err());
    assert!(parse_args(&args(&["keys", "--force"])).is_err());
    assert!(parse_args(&args(&["mini", "extra"])).is_err());
}

#[test]
fn parses_player_commands() {
    assert_eq!(parse_command("   "), Ok(None));
    assert_eq!(
        parse_command("search  blue line "),
        Ok(Some(CliCommand::Search("blue line".into())))
    );
    assert_eq!(parse_command("play 3"), Ok(Some(CliCommand::Play(3))));
    assert_eq!(parse_command("VOL 120"), Ok(Some(CliCommand::Volume(120))));
    assert_eq!(parse_command("auto off"), Ok(Some(CliCommand::Auto(Some(false)))));
    assert_eq!(parse_command("auto"), Ok(Some(CliCommand::Auto(None))));
    assert_eq!(parse_command("quit"), Ok(Some(CliCommand::Quit)));
}

#[test]
fn player_command_errors_are_messages() {
    assert!(parse_command("play").is_err());
    assert!(parse_command("play 0").is_err());
    assert!(parse_command("play two").is_err());
    assert!(parse_command("auto maybe").is_err());
    assert!(parse_command("dance").is_err());
}

#[test]
fn parses_console_input() {
    assert_eq!(parse_console("q"), Some(Console::Quit));
    assert_eq!(
        parse_console("search  Blue Line"),
        Some(Console::Search("Blue Line".into()))
    );
    assert_eq!(parse_console("search "), None);
    assert_eq!(parse_console("hello"), None);
}

struct Fixed(Option<String>);

impl StreamResolver for Fixed {
    fn resolve(&self) -> Option<String> {
        self.0.clone()
    }
}

fn track(id: &str, title: &str, artist: &str, album: &str) -> TrackDescriptor {
    TrackDescriptor::new(
        TrackId::new(id),
        title,
        artist,
        album,
        200,
        Arc::new(Fixed(Some(format!("/music/{id}.flac")))),
    )
}

#[test]
fn now_line_shows_state_progress_and_volume() {
    let t = track("a", "Blue Line", "Stereolab", "Dots and Loops");
    let progress = ProgressSnapshot {
        position: 65.4,
        duration: 200.0,
        transport: TransportState::Paused,
        volume: 40,
    };
    assert_eq!(
        format_now(Some(&t), &progress),
        "Stereolab - Blue Line [Paused] 1:05 / 3:20 vol 40"
    );
    assert_eq!(format_now(None, &progress), "nothing playing (vol 40)");
}

#[derive(Default)]
struct Silent {
    state: BackendState,
}

impl Backend for Silent {
    fn load(&mut self, _uri: &str) -> Result<(), BackendError> {
        self.state = BackendState::Paused;
        Ok(())
    }

    fn play(&mut self) -> Result<(), BackendError> {
        self.state = BackendState::Playing;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), BackendError> {
        self.state = BackendState::Paused;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BackendError> {
        self.state = BackendState::Stopped;
        Ok(())
    }

    fn set_volume(&mut self, _volume: u8) -> Result<(), BackendError> {
        Ok(())
    }

    fn position(&self) -> f64 {
        0.0
    }

    fn length(&self) -> i64 {
        200_000
    }

    fn state(&self) -> BackendState {
        self.state
    }
}

fn session(catalog: Option<LibraryCatalog>) -> PlayerSession<LibraryCatalog, Silent> {
    let settings = ControllerSettings {
        poll_interval: Duration::from_secs(3600),
        advance_delay: Duration::ZERO,
        auto_advance: true,
        volume: 70,
        volume_step: 10,
    };
    PlayerSession::new(SessionController::new(Silent::default(), settings), catalog, 50)
}

fn library() -> LibraryCatalog {
    LibraryCatalog::from_tracks(vec![
        track("s/01", "Brakhage", "Stereolab", "Dots and Loops"),
        track("s/02", "Blue Line", "Stereolab", "Dots and Loops"),
        track("m/01", "Blue Monday", "New Order", "Power, Corruption & Lies"),
    ])
}

fn exec(session: &mut PlayerSession<LibraryCatalog, Silent>, line: &str) -> String {
    let mut out = Vec::new();
    let cmd = parse_command(line).unwrap().unwrap();
    assert!(session.execute(cmd, &mut out).unwrap());
    String::from_utf8(out).unwrap()
}

#[test]
fn play_queues_the_last_search_results() {
    let mut s = session(Some(library()));
    let listed = exec(&mut s, "search blue");
    assert!(listed.contains("1. Stereolab - Blue Line"));
    assert!(listed.contains("2. New Order - Blue Monday"));

    assert_eq!(exec(&mut s, "play 2"), "playing New Order - Blue Monday\n");
    let playlist = exec(&mut s, "playlist");
    assert!(playlist.contains(">  2. New Order - Blue Monday"));
    assert!(exec(&mut s, "now").starts_with("New Order - Blue Monday [Playing]"));

    assert_eq!(exec(&mut s, "next"), "end of queue reached\n");
    assert_eq!(exec(&mut s, "prev"), "playing Stereolab - Blue Line\n");
}

#[test]
fn play_outside_results_reports_range() {
    let mut s = session(Some(library()));
    exec(&mut s, "search brakhage");
    assert_eq!(
        exec(&mut s, "play 4"),
        "track 4 is out of range (queue holds 1)\n"
    );
    assert_eq!(exec(&mut s, "pause"), "no track is playing\n");
}

#[test]
fn album_replaces_queue_and_starts_first_track() {
    let mut s = session(Some(library()));
    let out = exec(&mut s, "album dots");
    assert!(out.ends_with("playing Stereolab - Brakhage\n"));
    assert_eq!(exec(&mut s, "pause"), "paused\n");
    assert_eq!(exec(&mut s, "pause"), "resumed\n");
    assert_eq!(exec(&mut s, "vol 150"), "volume 100\n");
    assert_eq!(exec(&mut s, "stop"), "stopped\n");
    assert_eq!(exec(&mut s, "stop"), "already stopped\n");
    assert_eq!(
        exec(&mut s, "now"),
        "nothing playing (vol 100)\nqueued: Stereolab - Brakhage\n"
    );
}

#[test]
fn auto_reports_and_sets_the_flag() {
    let mut s = session(None);
    assert_eq!(exec(&mut s, "auto"), "auto-advance on\n");
    assert_eq!(exec(&mut s, "auto off"), "auto-advance off\n");
    assert_eq!(exec(&mut s, "auto"), "auto-advance off\n");
}

#[test]
fn catalog_commands_without_a_library_report_sign_in() {
    let mut s = session(None);
    assert_eq!(exec(&mut s, "search blue"), "not signed in to a catalog\n");
    assert_eq!(exec(&mut s, "radio stereolab"), "not signed in to a catalog\n");
}

#[test]
fn quit_ends_the_loop() {
    let mut s = session(None);
    let mut out = Vec::new();
    assert!(!s.execute(CliCommand::Quit, &mut out).unwrap());
}

#[test]
fn broken_config_falls_back_to_defaults_with_a_note() {
    let (settings, note) = resolve(Ok(Settings::default()));
    assert!(note.is_none());
    assert_eq!(settings.playback.poll_interval_ms, 500);

    let mut invalid = Settings::default();
    invalid.playback.poll_interval_ms = 0;
    invalid.playback.volume = 5;
    let (settings, note) = resolve(Ok(invalid));
    assert_eq!(settings.playback.volume, Settings::default().playback.volume);
    assert!(note.unwrap().starts_with("invalid config"));

    let (_, note) = resolve(Err("expected a table".into()));
    assert!(note.unwrap().contains("expected a table"));
}
