//! One-way control of a desktop player through UI automation.
//!
//! Commands are injected as keyboard shortcuts into the player's window.
//! Nothing acknowledges them, so a successful `send` only says the
//! shortcut was delivered, not that the player acted on it.

use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::BridgeSettings;
use crate::keys::MediaKey;

use super::automation::{Automation, Modifier, OsaScript};
use super::error::BridgeError;

const SEARCH_KEY: u16 = 3;
const SEARCH_PAUSE: Duration = Duration::from_millis(500);

/// Logical command accepted by the push transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    PlayPause,
    Next,
    Previous,
    VolumeUp,
    VolumeDown,
    Mute,
    /// Open the player's search field and type the query.
    Search(String),
}

impl From<MediaKey> for Command {
    fn from(key: MediaKey) -> Self {
        match key {
            MediaKey::PlayPause => Command::PlayPause,
            MediaKey::Next => Command::Next,
            MediaKey::Previous => Command::Previous,
            MediaKey::VolumeUp => Command::VolumeUp,
            MediaKey::VolumeDown => Command::VolumeDown,
            MediaKey::Mute => Command::Mute,
        }
    }
}

/// Key code and modifiers the desktop player binds `command` to.
fn shortcut(command: &Command) -> Option<(u16, &'static [Modifier])> {
    const CMD: &[Modifier] = &[Modifier::Command];
    match command {
        Command::PlayPause => Some((49, &[])),
        Command::Next => Some((124, CMD)),
        Command::Previous => Some((123, CMD)),
        Command::VolumeUp => Some((126, CMD)),
        Command::VolumeDown => Some((125, CMD)),
        Command::Mute | Command::Search(_) => None,
    }
}

/// Push transport into an externally owned desktop player.
pub struct DesktopBridge<A: Automation = OsaScript> {
    automation: A,
    candidates: Vec<String>,
    settle: Duration,
    located: OnceLock<String>,
}

impl DesktopBridge<OsaScript> {
    pub fn from_settings(settings: &BridgeSettings) -> Self {
        Self::new(OsaScript::new(), settings)
    }
}

impl<A: Automation> DesktopBridge<A> {
    pub fn new(automation: A, settings: &BridgeSettings) -> Self {
        Self {
            automation,
            candidates: settings.app_names.clone(),
            settle: Duration::from_millis(settings.launch_settle_ms),
            located: OnceLock::new(),
        }
    }

    /// First installed candidate; a hit is kept for the process lifetime.
    pub fn locate(&self) -> Result<&str, BridgeError> {
        if let Some(name) = self.located.get() {
            return Ok(name);
        }
        let found = self
            .candidates
            .iter()
            .find(|name| self.automation.app_installed(name))
            .ok_or(BridgeError::AppNotFound)?;
        info!("found desktop player: {found}");
        Ok(self.located.get_or_init(|| found.clone()))
    }

    /// Name found by an earlier `locate`, without probing again.
    pub fn app_name(&self) -> Option<&str> {
        self.located.get().map(String::as_str)
    }

    pub fn is_running(&self) -> bool {
        self.app_name()
            .is_some_and(|name| self.automation.is_running(name))
    }

    /// Start the player unless it already runs, then wait for it to settle.
    pub fn launch(&self) -> Result<(), BridgeError> {
        let name = self.app_name().ok_or(BridgeError::AppNotFound)?;
        if self.automation.is_running(name) {
            debug!("{name} is already running");
            return Ok(());
        }
        self.automation.open_app(name)?;
        thread::sleep(self.settle);
        info!("launched {name}");
        Ok(())
    }

    /// Deliver `command` as a keyboard shortcut.
    pub fn send(&self, command: Command) -> Result<(), BridgeError> {
        let name = self.app_name().ok_or(BridgeError::AppNotFound)?;
        if !self.automation.is_running(name) {
            return Err(BridgeError::AppNotRunning);
        }

        if let Command::Search(query) = &command {
            self.automation.activate(name)?;
            self.automation
                .key_code(name, SEARCH_KEY, &[Modifier::Command])?;
            thread::sleep(SEARCH_PAUSE);
            self.automation.keystroke(name, query)?;
            debug!("sent search \"{query}\" to {name}");
            return Ok(());
        }

        let (code, modifiers) = shortcut(&command).ok_or(BridgeError::Unsupported("mute"))?;
        self.automation.activate(name)?;
        self.automation.key_code(name, code, modifiers)?;
        debug!("sent {command:?} to {name}");
        Ok(())
    }

    /// Title of the player's front window; a weak hint at the current track.
    pub fn window_title(&self) -> Option<String> {
        let name = self.app_name()?;
        if !self.automation.is_running(name) {
            return None;
        }
        self.automation.window_title(name)
    }

    /// Send and log failures; used where a key press has no caller to report to.
    pub fn send_logged(&self, command: Command) {
        match self.send(command) {
            Ok(()) => {}
            Err(e @ BridgeError::Unsupported(_)) => info!("{e}"),
            Err(e) => warn!("{e}"),
        }
    }
}
