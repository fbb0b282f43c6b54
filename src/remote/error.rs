use thiserror::Error;

/// Failures of the push transport. All of them are recoverable by the caller.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("desktop player is not installed")]
    AppNotFound,
    #[error("desktop player is not running")]
    AppNotRunning,
    #[error("failed to launch desktop player: {0}")]
    LaunchFailed(String),
    #[error("automation request failed: {0}")]
    Automation(String),
    #[error("{0} has no desktop shortcut")]
    Unsupported(&'static str),
}

/// Failures of the pull transport.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Not connected; the client reconnects on its own.
    #[error("connection to remote player lost")]
    ConnectionLost,
    #[error("invalid endpoint {0}")]
    InvalidEndpoint(String),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
    #[error("malformed message: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
