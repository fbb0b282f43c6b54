//! OS UI automation used by the push transport.

use std::path::PathBuf;
use std::process::Command;

use log::debug;

use super::error::BridgeError;

/// Modifier held while a key code is injected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Modifier {
    Command,
}

impl Modifier {
    fn applescript(self) -> &'static str {
        match self {
            Modifier::Command => "command down",
        }
    }
}

/// Opaque OS capability for driving another application's UI.
///
/// Nothing here is acknowledged by the target: `Ok` only means the
/// automation request was issued.
pub trait Automation: Send + Sync {
    fn app_installed(&self, name: &str) -> bool;
    fn is_running(&self, name: &str) -> bool;
    fn open_app(&self, name: &str) -> Result<(), BridgeError>;
    fn activate(&self, name: &str) -> Result<(), BridgeError>;
    fn key_code(&self, app: &str, code: u16, modifiers: &[Modifier]) -> Result<(), BridgeError>;
    fn keystroke(&self, app: &str, text: &str) -> Result<(), BridgeError>;
    fn window_title(&self, app: &str) -> Option<String>;
}

/// `osascript` / `open` based automation for macOS.
pub struct OsaScript {
    app_dirs: Vec<PathBuf>,
}

impl Default for OsaScript {
    fn default() -> Self {
        let mut app_dirs = vec![PathBuf::from("/Applications")];
        if let Some(home) = std::env::var_os("HOME") {
            app_dirs.push(PathBuf::from(home).join("Applications"));
        }
        Self { app_dirs }
    }
}

impl OsaScript {
    pub fn new() -> Self {
        Self::default()
    }
}

fn run_applescript(script: &str) -> Result<String, String> {
    let output = Command::new("/usr/bin/osascript")
        .arg("-e")
        .arg(script)
        .output()
        .map_err(|e| e.to_string())?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
    }
}

fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\n', '\r'], " ")
}

fn using_clause(modifiers: &[Modifier]) -> String {
    if modifiers.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = modifiers.iter().map(|m| m.applescript()).collect();
    format!(" using {{{}}}", names.join(", "))
}

fn script(body: String) -> Result<(), BridgeError> {
    run_applescript(&body)
        .map(|_| ())
        .map_err(BridgeError::Automation)
}

impl Automation for OsaScript {
    fn app_installed(&self, name: &str) -> bool {
        let bundle = format!("{name}.app");
        self.app_dirs.iter().any(|dir| dir.join(&bundle).exists())
    }

    fn is_running(&self, name: &str) -> bool {
        let body = format!(
            "tell application \"System Events\" to return \"{}\" is in \
             (name of every application process)",
            applescript_escape(name)
        );
        match run_applescript(&body) {
            Ok(out) => out == "true",
            Err(e) => {
                debug!("process list query failed: {e}");
                false
            }
        }
    }

    fn open_app(&self, name: &str) -> Result<(), BridgeError> {
        let status = Command::new("open")
            .arg("-a")
            .arg(name)
            .status()
            .map_err(|e| BridgeError::LaunchFailed(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(BridgeError::LaunchFailed(format!("open -a {name}: {status}")))
        }
    }

    fn activate(&self, name: &str) -> Result<(), BridgeError> {
        script(format!(
            "tell application \"{}\" to activate",
            applescript_escape(name)
        ))
    }

    fn key_code(&self, app: &str, code: u16, modifiers: &[Modifier]) -> Result<(), BridgeError> {
        script(format!(
            "tell application \"System Events\"\n\
             tell process \"{}\"\n\
             set frontmost to true\n\
             key code {code}{}\n\
             end tell\n\
             end tell",
            applescript_escape(app),
            using_clause(modifiers)
        ))
    }

    fn keystroke(&self, app: &str, text: &str) -> Result<(), BridgeError> {
        script(format!(
            "tell application \"System Events\"\n\
             tell process \"{}\"\n\
             set frontmost to true\n\
             keystroke \"{}\"\n\
             end tell\n\
             end tell",
            applescript_escape(app),
            applescript_escape(text)
        ))
    }

    fn window_title(&self, app: &str) -> Option<String> {
        let body = format!(
            "tell application \"System Events\"\n\
             tell process \"{}\"\n\
             if exists window 1 then\n\
             return name of window 1\n\
             else\n\
             return \"\"\n\
             end if\n\
             end tell\n\
             end tell",
            applescript_escape(app)
        );
        run_applescript(&body).ok().filter(|t| !t.is_empty())
    }
}
