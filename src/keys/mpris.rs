//! Media key capture through an MPRIS service on the session bus.
//!
//! Desktop environments route hardware media keys to the active MPRIS
//! player. Registering as one turns those method calls into raw key
//! events for the debouncer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use async_io::{Timer, block_on};
use log::debug;
use zbus::{Connection, interface};
use zvariant::{OwnedValue, Value};

use super::capture::CaptureBackend;
use super::debouncer::Debouncer;
use super::{KeyError, RawKey, VK_NEXT, VK_PLAY_PAUSE, VK_PREVIOUS};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.incallide";

struct RootIface;

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {}

    fn quit(&self) {}

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "incallide"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    debouncer: Arc<Mutex<Debouncer>>,
    title: Arc<Mutex<Option<String>>>,
}

impl PlayerIface {
    fn press(&self, code: u32) {
        self.debouncer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handle(RawKey::Code(code));
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        self.press(VK_NEXT);
    }

    fn previous(&self) {
        self.press(VK_PREVIOUS);
    }

    fn play(&self) {
        self.press(VK_PLAY_PAUSE);
    }

    fn pause(&self) {
        self.press(VK_PLAY_PAUSE);
    }

    fn play_pause(&self) {
        self.press(VK_PLAY_PAUSE);
    }

    fn stop(&self) {
        debug!("MPRIS stop has no media key");
    }

    /// Always claims playback so the desktop routes media keys here.
    #[zbus(property)]
    fn playback_status(&self) -> &str {
        "Playing"
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let title = self
            .title
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_default();
        if let Ok(value) = OwnedValue::try_from(Value::from(title)) {
            map.insert("xesam:title".to_string(), value);
        }
        map
    }
}

/// [`CaptureBackend`] serving `org.mpris.MediaPlayer2.incallide`.
pub struct MprisCapture {
    title: Arc<Mutex<Option<String>>>,
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl Default for MprisCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl MprisCapture {
    pub fn new() -> Self {
        Self {
            title: Arc::new(Mutex::new(None)),
            stop: Arc::new(AtomicBool::new(false)),
            join: None,
        }
    }

    /// Title shown by MPRIS clients such as `playerctl metadata`.
    pub fn set_title(&self, title: Option<String>) {
        *self.title.lock().unwrap_or_else(PoisonError::into_inner) = title;
    }
}

async fn register(player: PlayerIface) -> zbus::Result<Connection> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let object_server = connection.object_server();
    object_server.at(OBJECT_PATH, RootIface).await?;
    object_server.at(OBJECT_PATH, player).await?;
    Ok(connection)
}

async fn serve(player: PlayerIface, stop: Arc<AtomicBool>, ready: Sender<Result<(), String>>) {
    let connection = match register(player).await {
        Ok(c) => {
            let _ = ready.send(Ok(()));
            c
        }
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };

    while !stop.load(Ordering::Relaxed) {
        Timer::after(Duration::from_millis(200)).await;
    }

    if let Err(e) = connection.release_name(BUS_NAME).await {
        debug!("MPRIS: releasing bus name failed: {e}");
    }
}

impl CaptureBackend for MprisCapture {
    fn open(&mut self, debouncer: Arc<Mutex<Debouncer>>) -> Result<(), KeyError> {
        self.stop.store(false, Ordering::Relaxed);
        let player = PlayerIface {
            debouncer,
            title: Arc::clone(&self.title),
        };
        let stop = Arc::clone(&self.stop);
        let (ready_tx, ready_rx) = mpsc::channel();

        let join = thread::Builder::new()
            .name("mpris".into())
            .spawn(move || block_on(serve(player, stop, ready_tx)))
            .map_err(|e| KeyError::StartupFailure(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.join = Some(join);
                Ok(())
            }
            Ok(Err(reason)) => {
                let _ = join.join();
                Err(KeyError::StartupFailure(reason))
            }
            Err(_) => {
                let _ = join.join();
                Err(KeyError::StartupFailure("MPRIS thread exited".into()))
            }
        }
    }

    fn close(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
