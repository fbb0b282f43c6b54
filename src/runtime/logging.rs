use std::panic;
use std::thread;

use log::{LevelFilter, error};

use crate::config::Settings;

/// Install the colog logger and a panic hook that reports through it.
///
/// `cap` bounds the verbosity, e.g. `Warn` while a full-screen UI owns the
/// terminal.
pub fn init(settings: &Settings, cap: Option<LevelFilter>) {
    let configured = settings.log_level().unwrap_or(LevelFilter::Info);
    let level = match cap {
        Some(cap) => configured.min(cap),
        None => configured,
    };

    let mut clog = colog::default_builder();
    clog.filter(None, level);
    clog.init();

    panic::set_hook(Box::new(|info| {
        let thread = thread::current();
        let name = thread.name().unwrap_or("<unnamed>");
        error!("thread '{name}' panicked: {info}");
    }));
}
