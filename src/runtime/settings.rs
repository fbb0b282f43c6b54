use crate::config::Settings;

/// Settings to run with, plus a note when the config had to be discarded.
///
/// The note is logged by the caller once logging is up.
pub fn load_settings() -> (Settings, Option<String>) {
    resolve(Settings::load().map_err(|e| e.to_string()))
}

pub(super) fn resolve(loaded: Result<Settings, String>) -> (Settings, Option<String>) {
    match loaded {
        Ok(settings) => match settings.validate() {
            Ok(()) => (settings, None),
            Err(msg) => (
                Settings::default(),
                Some(format!("invalid config, using defaults: {msg}")),
            ),
        },
        Err(e) => (
            Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    }
}
