//! JSON messages exchanged with the remote player's state feed.

use serde::{Deserialize, Serialize};

use crate::keys::MediaKey;

/// Full playback state pushed by the remote player.
///
/// Every update replaces the previous one; absent fields take defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackUpdate {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub is_playing: bool,
    /// Seconds.
    pub position: f64,
    /// Seconds.
    pub duration: f64,
    pub volume: f64,
}

impl Default for TrackUpdate {
    fn default() -> Self {
        Self {
            title: "Unknown".to_string(),
            artist: "Unknown".to_string(),
            album: "Unknown".to_string(),
            is_playing: false,
            position: 0.0,
            duration: 0.0,
            volume: 70.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    TrackUpdate {
        #[serde(default)]
        data: TrackUpdate,
    },
    Pong,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Outbound {
    RequestInfo,
    Ping,
    Command(MediaKey),
}

pub fn decode(text: &str) -> Result<Inbound, serde_json::Error> {
    serde_json::from_str(text)
}

pub fn encode(message: &Outbound) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}
