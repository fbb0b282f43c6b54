use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, warn};
use rodio::{OutputStreamBuilder, Sink};

use super::sink::create_sink;
use super::types::{BackendError, BackendState, EngineCmd, StatusHandle};

const TICK: Duration = Duration::from_millis(50);

/// Everything the engine thread knows about the loaded media.
pub(super) struct Loaded {
    pub(super) sink: Option<Sink>,
    pub(super) length: Option<Duration>,
    pub(super) stopped: bool,
}

impl Loaded {
    pub(super) fn state(&self) -> BackendState {
        match self.sink.as_ref() {
            None if self.stopped => BackendState::Stopped,
            None => BackendState::Idle,
            Some(s) if s.empty() => BackendState::Ended,
            Some(s) if s.is_paused() => BackendState::Paused,
            Some(_) => BackendState::Playing,
        }
    }

    fn drop_sink(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.length = None;
    }
}

fn publish(status: &StatusHandle, loaded: &Loaded) {
    if let Ok(mut st) = status.lock() {
        st.state = loaded.state();
        st.position = loaded
            .sink
            .as_ref()
            .map_or(Duration::ZERO, |s| s.get_pos());
        st.length = loaded.length;
    }
}

/// Spawn the thread that owns the output stream and the current sink.
///
/// `ready` receives the outcome of opening the default output device before
/// any command is processed.
pub(super) fn spawn_engine_thread(
    rx: Receiver<EngineCmd>,
    status: StatusHandle,
    ready: Sender<Result<(), BackendError>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(BackendError::NoOutput(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped; noisy for a terminal app.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let mut loaded = Loaded {
            sink: None,
            length: None,
            stopped: false,
        };
        let mut volume: f32 = 1.0;

        loop {
            match rx.recv_timeout(TICK) {
                Ok(cmd) => match cmd {
                    EngineCmd::Load { path, reply } => {
                        loaded.drop_sink();
                        let result = create_sink(&stream, &path).map(|(sink, length)| {
                            sink.set_volume(volume);
                            loaded.sink = Some(sink);
                            loaded.length = length;
                            loaded.stopped = false;
                        });
                        if let Err(e) = &result {
                            warn!("engine: {e}");
                        }
                        // Publish before replying so callers never see the previous media's state.
                        publish(&status, &loaded);
                        let _ = reply.send(result);
                        continue;
                    }
                    EngineCmd::Play => {
                        if let Some(s) = loaded.sink.as_ref() {
                            s.play();
                        }
                    }
                    EngineCmd::Pause => {
                        if let Some(s) = loaded.sink.as_ref() {
                            s.pause();
                        }
                    }
                    EngineCmd::Stop => {
                        loaded.drop_sink();
                        loaded.stopped = true;
                    }
                    EngineCmd::SetVolume(v) => {
                        volume = f32::from(v.min(100)) / 100.0;
                        if let Some(s) = loaded.sink.as_ref() {
                            s.set_volume(volume);
                        }
                    }
                    EngineCmd::Quit => {
                        loaded.drop_sink();
                        debug!("engine: quit");
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    loaded.drop_sink();
                    break;
                }
            }

            publish(&status, &loaded);
        }
    })
}
