//! Media-key companion for a desktop player: captures media keys and
//! forwards them as keyboard shortcuts.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::Settings;
use crate::keys::{Debouncer, KeyCapture, MediaKey, MprisCapture};
use crate::remote::{Command, DesktopBridge};

/// Input typed while the companion runs.
#[derive(Debug, PartialEq, Eq)]
pub enum Console {
    Quit,
    Search(String),
}

pub fn parse_console(line: &str) -> Option<Console> {
    let line = line.trim();
    match line {
        "q" | "quit" => Some(Console::Quit),
        _ => line
            .strip_prefix("search ")
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| Console::Search(q.to_string())),
    }
}

/// Forward stdin lines; on EOF the companion keeps running.
fn spawn_console() -> io::Result<Receiver<Console>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new().name("console".into()).spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_console(&line) {
                Some(cmd) => {
                    if tx.send(cmd).is_err() {
                        break;
                    }
                }
                None => eprintln!("commands: search <text>, q"),
            }
        }
        debug!("console closed");
    })?;
    Ok(rx)
}

pub fn run(settings: &Settings, auto_launch: bool) -> Result<(), Box<dyn std::error::Error>> {
    let auto_launch = auto_launch || settings.bridge.auto_launch;
    let bridge = Arc::new(DesktopBridge::from_settings(&settings.bridge));
    let name = bridge.locate()?.to_string();

    if auto_launch {
        bridge.launch()?;
    } else if !bridge.is_running() {
        warn!("{name} is not running; key presses are dropped until it starts");
    }

    let mut debouncer = Debouncer::new(Duration::from_millis(settings.keys.debounce_ms))
        .with_sink(bridge.clone());
    for key in [
        MediaKey::PlayPause,
        MediaKey::Next,
        MediaKey::Previous,
        MediaKey::VolumeUp,
        MediaKey::VolumeDown,
        MediaKey::Mute,
    ] {
        debouncer.on_key(key, |k| debug!("forwarding {k:?}"));
    }
    let mut capture = KeyCapture::new(MprisCapture::new(), debouncer);
    capture.start()?;
    info!("forwarding media keys to {name} (type q to quit)");

    let console = spawn_console()?;
    let interval = Duration::from_millis(settings.bridge.watch_interval_ms);
    let mut was_running = bridge.is_running();

    loop {
        match console.recv_timeout(interval) {
            Ok(Console::Quit) => break,
            Ok(Console::Search(query)) => bridge.send_logged(Command::Search(query)),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => thread::sleep(interval),
        }

        let running = bridge.is_running();
        if was_running && !running {
            info!("{name} stopped running");
        }
        if !running && auto_launch {
            if let Err(e) = bridge.launch() {
                warn!("relaunching {name} failed: {e}");
            }
        }
        was_running = bridge.is_running();
        capture.backend().set_title(bridge.window_title());
    }

    capture.stop();
    let stats = capture.stats();
    info!(
        "handled {} media key presses ({} received)",
        stats.accepted, stats.pressed
    );
    Ok(())
}
