use std::env;

use log::{LevelFilter, warn};

mod companion;
mod logging;
mod mini;
mod player;
mod settings;

const USAGE: &str = "\
usage: incallide [COMMAND]

  play [DIR]             line-oriented player over a local music library (default)
  mini                   mini player mirroring a remote player
  keys [--auto-launch]   forward media keys to the desktop player
  help                   show this message";

#[derive(Debug, PartialEq, Eq)]
enum Mode {
    Play(Option<String>),
    Mini,
    Keys { auto_launch: bool },
    Help,
}

/// Parse the arguments after the program name.
fn parse_args(args: &[String]) -> Result<Mode, String> {
    let mut args = args.iter().map(String::as_str);
    let mode = match args.next() {
        None => Mode::Play(None),
        Some("play") => Mode::Play(args.next().map(str::to_string)),
        Some("mini") => Mode::Mini,
        Some("keys") => match args.next() {
            None => Mode::Keys { auto_launch: false },
            Some("--auto-launch") => Mode::Keys { auto_launch: true },
            Some(other) => return Err(format!("unknown option for keys: {other}")),
        },
        Some("help" | "-h" | "--help") => Mode::Help,
        // A bare directory keeps `incallide ~/Music` working.
        Some(dir) if !dir.starts_with('-') => Mode::Play(Some(dir.to_string())),
        Some(other) => return Err(format!("unknown option: {other}")),
    };
    if let Some(extra) = args.next() {
        return Err(format!("unexpected argument: {extra}"));
    }
    Ok(mode)
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mode = match parse_args(&args) {
        Ok(mode) => mode,
        Err(msg) => {
            eprintln!("incallide: {msg}\n\n{USAGE}");
            return Err(msg.into());
        }
    };

    if mode == Mode::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let (settings, config_note) = settings::load_settings();
    let cap = match mode {
        Mode::Mini => Some(LevelFilter::Error),
        _ => None,
    };
    logging::init(&settings, cap);
    if let Some(note) = config_note {
        if mode == Mode::Mini {
            eprintln!("incallide: {note}");
        } else {
            warn!("{note}");
        }
    }

    match mode {
        Mode::Help => Ok(()),
        Mode::Play(dir) => player::run(&settings, dir),
        Mode::Mini => mini::run(&settings),
        Mode::Keys { auto_launch } => companion::run(&settings, auto_launch),
    }
}

#[cfg(test)]
mod tests;
