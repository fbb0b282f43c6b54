//! Pull transport: a websocket client mirroring a remote player's state.
//!
//! A background thread keeps one connection open, asks for the current
//! state right after connecting and probes the remote whenever it has been
//! silent for the receive timeout. Any error tears the connection down; the
//! thread then waits out the backoff and starts over, for as long as the
//! client lives.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tungstenite::handshake::HandshakeError;
use tungstenite::http::Uri;
use tungstenite::{Message, WebSocket};

use crate::config::RemoteSettings;
use crate::keys::MediaKey;
use crate::playback::ProgressSnapshot;

use super::error::SyncError;
use super::message::{self, Inbound, Outbound};
use super::snapshot::NowPlaying;

/// Upper bound on how long a blocked read delays shutdown or outgoing commands.
const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub endpoint: String,
    pub receive_timeout: Duration,
    pub reconnect_backoff: Duration,
    pub connect_timeout: Duration,
}

impl From<&RemoteSettings> for SyncSettings {
    fn from(s: &RemoteSettings) -> Self {
        Self {
            endpoint: s.endpoint.clone(),
            receive_timeout: Duration::from_millis(s.receive_timeout_ms.max(1)),
            reconnect_backoff: Duration::from_millis(s.reconnect_backoff_ms),
            connect_timeout: Duration::from_millis(s.connect_timeout_ms.max(1)),
        }
    }
}

/// Host, port and URL of a `ws://` endpoint.
#[derive(Debug, Clone)]
struct Endpoint {
    url: String,
    host: String,
    port: u16,
}

impl Endpoint {
    fn parse(url: &str) -> Result<Self, SyncError> {
        let invalid = || SyncError::InvalidEndpoint(url.to_string());
        let uri: Uri = url.parse().map_err(|_| invalid())?;
        if uri.scheme_str() != Some("ws") {
            return Err(invalid());
        }
        let host = uri.host().ok_or_else(invalid)?.to_string();
        Ok(Self {
            url: url.to_string(),
            host,
            port: uri.port_u16().unwrap_or(80),
        })
    }
}

#[derive(Default)]
struct Mirror {
    connection: ConnectionState,
    now_playing: Option<NowPlaying>,
    /// Set while disconnected; extrapolation freezes at this instant.
    lost_at: Option<Instant>,
}

#[derive(Default)]
struct Shared {
    mirror: Mutex<Mirror>,
    shutdown: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Mirror> {
        self.mirror.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_connection(&self, state: ConnectionState) {
        let mut mirror = self.lock();
        if mirror.connection == state {
            return;
        }
        mirror.connection = state;
        match state {
            ConnectionState::Connected => mirror.lost_at = None,
            _ if mirror.lost_at.is_none() => mirror.lost_at = Some(Instant::now()),
            _ => {}
        }
    }

    fn stopping(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

/// Handle to the background connection. Dropping it stops the thread.
pub struct SyncClient {
    shared: Arc<Shared>,
    commands: Sender<MediaKey>,
    join: Option<JoinHandle<()>>,
}

impl SyncClient {
    pub fn start(settings: SyncSettings) -> Result<Self, SyncError> {
        let endpoint = Endpoint::parse(&settings.endpoint)?;
        let shared = Arc::new(Shared::default());
        let (tx, rx) = mpsc::channel();

        let thread_shared = Arc::clone(&shared);
        let join = thread::Builder::new()
            .name("remote-sync".into())
            .spawn(move || run(&thread_shared, &settings, &endpoint, &rx))?;

        Ok(Self {
            shared,
            commands: tx,
            join: Some(join),
        })
    }

    pub fn connection(&self) -> ConnectionState {
        self.shared.lock().connection
    }

    /// Last snapshot received, kept across disconnects.
    pub fn now_playing(&self) -> Option<NowPlaying> {
        self.shared.lock().now_playing.clone()
    }

    /// Snapshot with extrapolated position; frozen while disconnected.
    pub fn progress(&self) -> Option<ProgressSnapshot> {
        let mirror = self.shared.lock();
        let at = mirror.lost_at.unwrap_or_else(Instant::now);
        mirror.now_playing.as_ref().map(|np| np.progress_at(at))
    }

    /// Forward a command to the remote. Fails while not connected.
    pub fn send_command(&self, key: MediaKey) -> Result<(), SyncError> {
        if self.connection() != ConnectionState::Connected {
            return Err(SyncError::ConnectionLost);
        }
        self.commands
            .send(key)
            .map_err(|_| SyncError::ConnectionLost)
    }

    pub fn shutdown(&mut self) {
        self.shared.shutdown.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for SyncClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(
    shared: &Shared,
    settings: &SyncSettings,
    endpoint: &Endpoint,
    commands: &Receiver<MediaKey>,
) {
    while !shared.stopping() {
        shared.set_connection(ConnectionState::Connecting);
        match connect(settings, endpoint) {
            Ok(mut socket) => {
                info!("connected to {}", endpoint.url);
                shared.set_connection(ConnectionState::Connected);
                // Commands issued before this connection existed are stale.
                while commands.try_recv().is_ok() {}

                let result = receive_loop(shared, settings, &mut socket, commands);
                shared.set_connection(ConnectionState::Disconnected);
                match result {
                    Ok(()) => {
                        let _ = socket.close(None);
                        let _ = socket.flush();
                        break;
                    }
                    Err(e) => warn!("connection to {} lost: {e}", endpoint.url),
                }
            }
            Err(e) => {
                shared.set_connection(ConnectionState::Disconnected);
                debug!("connecting to {} failed: {e}", endpoint.url);
            }
        }

        debug!("retrying in {:?}", settings.reconnect_backoff);
        if !wait_backoff(shared, settings.reconnect_backoff) {
            break;
        }
    }
    shared.set_connection(ConnectionState::Disconnected);
    debug!("sync thread exiting");
}

fn connect(
    settings: &SyncSettings,
    endpoint: &Endpoint,
) -> Result<WebSocket<TcpStream>, SyncError> {
    let mut last_err = None;
    let mut stream = None;
    for addr in (endpoint.host.as_str(), endpoint.port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, settings.connect_timeout) {
            Ok(s) => {
                stream = Some(s);
                break;
            }
            Err(e) => last_err = Some(e),
        }
    }
    let stream = match (stream, last_err) {
        (Some(s), _) => s,
        (None, Some(e)) => return Err(e.into()),
        (None, None) => return Err(SyncError::InvalidEndpoint(endpoint.url.clone())),
    };
    stream.set_read_timeout(Some(settings.connect_timeout))?;

    let (mut socket, _response) =
        tungstenite::client(endpoint.url.as_str(), stream).map_err(|e| match e {
            HandshakeError::Failure(e) => SyncError::WebSocket(e),
            HandshakeError::Interrupted(_) => SyncError::ConnectionLost,
        })?;

    socket
        .get_ref()
        .set_read_timeout(Some(TICK.min(settings.receive_timeout)))?;
    send(&mut socket, &Outbound::RequestInfo)?;
    Ok(socket)
}

/// Read until shutdown (`Ok`) or until the connection fails (`Err`).
fn receive_loop(
    shared: &Shared,
    settings: &SyncSettings,
    socket: &mut WebSocket<TcpStream>,
    commands: &Receiver<MediaKey>,
) -> Result<(), SyncError> {
    let mut last_heard = Instant::now();
    loop {
        if shared.stopping() {
            return Ok(());
        }
        while let Ok(key) = commands.try_recv() {
            debug!("forwarding {key:?}");
            send(socket, &Outbound::Command(key))?;
        }

        match socket.read() {
            Ok(Message::Text(text)) => {
                last_heard = Instant::now();
                apply(shared, text.as_str());
            }
            Ok(Message::Close(_)) => return Err(SyncError::ConnectionLost),
            Ok(_) => last_heard = Instant::now(),
            Err(tungstenite::Error::Io(e))
                if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
            {
                if last_heard.elapsed() >= settings.receive_timeout {
                    send(socket, &Outbound::Ping)?;
                    last_heard = Instant::now();
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn apply(shared: &Shared, text: &str) {
    match message::decode(text) {
        Ok(Inbound::TrackUpdate { data }) => {
            debug!("track update: {} - {}", data.artist, data.title);
            shared.lock().now_playing = Some(NowPlaying::from_update(data, Instant::now()));
        }
        Ok(Inbound::Pong) => {}
        Ok(Inbound::Unknown) => debug!("ignoring message: {text}"),
        Err(e) => warn!("malformed message from remote: {e}"),
    }
}

fn send(socket: &mut WebSocket<TcpStream>, message: &Outbound) -> Result<(), SyncError> {
    let text = message::encode(message)?;
    socket.send(Message::text(text))?;
    Ok(())
}

/// Sleep for `backoff` in short steps; false when shutdown was requested.
fn wait_backoff(shared: &Shared, backoff: Duration) -> bool {
    let deadline = Instant::now() + backoff;
    loop {
        if shared.stopping() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(TICK.min(deadline - now));
    }
}
