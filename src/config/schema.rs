use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/incallide/config.toml` or
/// `~/.config/incallide/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `INCALLIDE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub library: LibrarySettings,
    pub remote: RemoteSettings,
    pub bridge: BridgeSettings,
    pub keys: KeySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Initial output volume (0-100).
    pub volume: u8,
    /// How often the session poller samples the backend (milliseconds).
    pub poll_interval_ms: u64,
    /// Pause between a track ending and the next one starting (milliseconds).
    pub advance_delay_ms: u64,
    /// Whether the next queued track starts automatically when one ends.
    pub auto_advance: bool,
    /// Volume change applied by the volume up/down keys.
    pub volume_step: u8,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: 70,
            poll_interval_ms: 500,
            advance_delay_ms: 1000,
            auto_advance: true,
            volume_step: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Music directory used when none is given on the command line.
    pub dir: Option<String>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
    /// Maximum number of tracks an artist radio queue holds.
    pub radio_limit: usize,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            dir: None,
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: false,
            max_depth: None,
            radio_limit: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// WebSocket endpoint of the desktop player's state feed.
    pub endpoint: String,
    /// Silence after which a liveness probe is sent (milliseconds).
    pub receive_timeout_ms: u64,
    /// Wait between reconnect attempts (milliseconds).
    pub reconnect_backoff_ms: u64,
    /// TCP connect timeout (milliseconds).
    pub connect_timeout_ms: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:9876".to_string(),
            receive_timeout_ms: 1000,
            reconnect_backoff_ms: 5000,
            connect_timeout_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Application names probed, in order, when locating the desktop player.
    pub app_names: Vec<String>,
    /// Time given to a freshly launched app before it is considered up (milliseconds).
    pub launch_settle_ms: u64,
    /// Launch the desktop app when it is not running.
    pub auto_launch: bool,
    /// How often the companion checks that the desktop app is still running (milliseconds).
    pub watch_interval_ms: u64,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            app_names: vec!["TIDAL".into(), "Tidal Luna".into(), "Tidal".into()],
            launch_settle_ms: 2000,
            auto_launch: false,
            watch_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeySettings {
    /// Repeat presses of the same key inside this window are dropped (milliseconds).
    pub debounce_ms: u64,
    /// Capture desktop media keys through an MPRIS service on the session bus.
    pub mpris: bool,
}

impl Default for KeySettings {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            mpris: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
