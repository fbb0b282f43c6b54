use super::controller::Tick;
use super::*;
use crate::audio::{Backend, BackendError, BackendState};
use crate::library::{StreamResolver, TrackDescriptor, TrackId};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

struct Fixed(Option<String>);

impl StreamResolver for Fixed {
    fn resolve(&self) -> Option<String> {
        self.0.clone()
    }
}

fn t(id: &str, secs: u64) -> TrackDescriptor {
    TrackDescriptor::new(
        TrackId::new(id),
        id.to_uppercase(),
        "Artist",
        "Album",
        secs,
        Arc::new(Fixed(Some(format!("/music/{id}.flac")))),
    )
}

fn unplayable(id: &str) -> TrackDescriptor {
    TrackDescriptor::new(TrackId::new(id), id, "Artist", "Album", 10, Arc::new(Fixed(None)))
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Load(String),
    Play,
    Pause,
    Stop,
    Volume(u8),
}

#[derive(Default)]
struct MockInner {
    calls: Vec<Call>,
    state: BackendState,
    length: i64,
    /// URIs the mock refuses to decode.
    corrupt: Vec<String>,
}

#[derive(Clone, Default)]
struct MockBackend(Arc<Mutex<MockInner>>);

impl MockBackend {
    fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().calls.clone()
    }

    fn loads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Load(uri) => Some(uri),
                _ => None,
            })
            .collect()
    }

    fn set_state(&self, state: BackendState) {
        self.0.lock().unwrap().state = state;
    }

    fn mark_corrupt(&self, uri: &str) {
        self.0.lock().unwrap().corrupt.push(uri.to_string());
    }

    fn clear(&self) {
        self.0.lock().unwrap().calls.clear();
    }
}

impl Backend for MockBackend {
    fn load(&mut self, uri: &str) -> Result<(), BackendError> {
        let mut inner = self.0.lock().unwrap();
        inner.calls.push(Call::Load(uri.to_string()));
        if inner.corrupt.iter().any(|c| c == uri) {
            return Err(BackendError::Load {
                uri: uri.to_string(),
                reason: "unsupported format".to_string(),
            });
        }
        inner.state = BackendState::Paused;
        inner.length = 30_000;
        Ok(())
    }

    fn play(&mut self) -> Result<(), BackendError> {
        let mut inner = self.0.lock().unwrap();
        inner.calls.push(Call::Play);
        inner.state = BackendState::Playing;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), BackendError> {
        let mut inner = self.0.lock().unwrap();
        inner.calls.push(Call::Pause);
        inner.state = BackendState::Paused;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BackendError> {
        let mut inner = self.0.lock().unwrap();
        inner.calls.push(Call::Stop);
        inner.state = BackendState::Stopped;
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) -> Result<(), BackendError> {
        self.0.lock().unwrap().calls.push(Call::Volume(volume));
        Ok(())
    }

    fn position(&self) -> f64 {
        if self.0.lock().unwrap().state == BackendState::Ended {
            1.0
        } else {
            0.5
        }
    }

    fn length(&self) -> i64 {
        self.0.lock().unwrap().length
    }

    fn state(&self) -> BackendState {
        self.0.lock().unwrap().state
    }
}

fn settings(poll_ms: u64, delay_ms: u64) -> ControllerSettings {
    ControllerSettings {
        poll_interval: Duration::from_millis(poll_ms),
        advance_delay: Duration::from_millis(delay_ms),
        auto_advance: true,
        volume: 70,
        volume_step: 10,
    }
}

/// Poller effectively parked so tests can drive ticks by hand.
fn manual() -> (SessionController<MockBackend>, MockBackend) {
    let backend = MockBackend::default();
    let ctl = SessionController::new(backend.clone(), settings(3_600_000, 0));
    (ctl, backend)
}

fn fast() -> (SessionController<MockBackend>, MockBackend) {
    let backend = MockBackend::default();
    let ctl = SessionController::new(backend.clone(), settings(10, 10));
    (ctl, backend)
}

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn replace_resets_cursor_to_first_track() {
    let mut q = Queue::new();
    q.replace(vec![t("a", 1), t("b", 1)]);
    q.advance().unwrap();
    assert_eq!(q.cursor(), 1);

    let tracks = vec![t("x", 1), t("y", 1), t("z", 1)];
    q.replace(tracks.clone());
    assert_eq!(q.cursor(), 0);
    assert!(q.current().unwrap().is_same(&tracks[0]));
}

#[test]
fn advance_stops_at_last_element() {
    for n in 1..6 {
        let mut q = Queue::new();
        q.replace((0..n).map(|i| t(&format!("t{i}"), 1)).collect());
        for _ in 0..n - 1 {
            q.advance().unwrap();
        }
        assert_eq!(q.cursor(), n - 1);
        assert!(q.is_at_end());
        assert!(matches!(q.advance(), Err(PlaybackError::EndOfQueue)));
        assert!(matches!(q.advance(), Err(PlaybackError::EndOfQueue)));
        assert_eq!(q.cursor(), n - 1);
    }
}

#[test]
fn retreat_and_jump_bounds() {
    let mut q = Queue::new();
    assert!(q.current().is_none());
    assert!(matches!(q.retreat(), Err(PlaybackError::AtStart)));
    assert!(matches!(q.advance(), Err(PlaybackError::EndOfQueue)));

    q.replace(vec![t("a", 1), t("b", 1), t("c", 1)]);
    assert!(matches!(q.retreat(), Err(PlaybackError::AtStart)));
    assert_eq!(q.cursor(), 0);

    assert_eq!(q.jump_to(2).unwrap().id().as_str(), "c");
    assert!(matches!(
        q.jump_to(3),
        Err(PlaybackError::OutOfRange { index: 3, len: 3 })
    ));
    assert_eq!(q.cursor(), 2);
    assert_eq!(q.retreat().unwrap().id().as_str(), "b");
}

#[test]
fn end_latch_fires_once_per_ended_run() {
    let mut latch = EndLatch::default();
    let fired = (0..5)
        .filter(|_| latch.observe(BackendState::Ended))
        .count();
    assert_eq!(fired, 1);

    assert!(!latch.observe(BackendState::Playing));
    assert!(latch.observe(BackendState::Ended));

    latch.reset();
    assert!(latch.observe(BackendState::Ended));
}

#[test]
fn play_tears_down_previous_media_before_loading() {
    let (ctl, backend) = manual();
    ctl.play(t("one", 30)).unwrap();
    ctl.play(t("two", 45)).unwrap();

    assert_eq!(
        backend.calls(),
        vec![
            Call::Stop,
            Call::Load("/music/one.flac".into()),
            Call::Volume(70),
            Call::Play,
            Call::Stop,
            Call::Load("/music/two.flac".into()),
            Call::Volume(70),
            Call::Play,
        ]
    );
    assert_eq!(ctl.transport(), TransportState::Playing);
    assert_eq!(ctl.current_track().unwrap().id().as_str(), "two");
    assert_eq!(ctl.progress().duration, 45.0);
}

#[test]
fn unresolvable_stream_never_reaches_the_backend() {
    let (ctl, backend) = manual();
    let err = ctl.play(unplayable("ghost")).unwrap_err();
    assert!(matches!(err, PlaybackError::StreamUnavailable(_)));
    assert_eq!(backend.calls(), vec![Call::Stop]);
    assert_eq!(ctl.transport(), TransportState::Stopped);
    assert!(ctl.current_track().is_none());
}

#[test]
fn pause_resume_toggles_with_one_backend_call() {
    let (ctl, backend) = manual();
    assert!(matches!(
        ctl.pause_resume(),
        Err(PlaybackError::NoActiveTrack)
    ));

    ctl.play(t("a", 10)).unwrap();
    backend.clear();

    assert_eq!(ctl.pause_resume().unwrap(), TransportState::Paused);
    assert_eq!(backend.calls(), vec![Call::Pause]);
    assert_eq!(ctl.pause_resume().unwrap(), TransportState::Playing);
    assert_eq!(backend.calls(), vec![Call::Pause, Call::Play]);

    ctl.stop();
    assert_eq!(ctl.transport(), TransportState::Stopped);
    assert!(ctl.current_track().is_none());
    assert!(matches!(
        ctl.pause_resume(),
        Err(PlaybackError::NoActiveTrack)
    ));
}

#[test]
fn next_and_previous_leave_playback_alone_at_the_edges() {
    let (ctl, backend) = manual();
    ctl.replace_queue(vec![t("a", 10), t("b", 10)]);
    ctl.play_index(0).unwrap();

    assert!(matches!(ctl.previous(), Err(PlaybackError::AtStart)));
    assert_eq!(ctl.next().unwrap().id().as_str(), "b");
    backend.clear();

    assert!(matches!(ctl.next(), Err(PlaybackError::EndOfQueue)));
    assert!(backend.calls().is_empty());
    assert_eq!(ctl.transport(), TransportState::Playing);
    assert_eq!(ctl.current_track().unwrap().id().as_str(), "b");

    assert_eq!(ctl.previous().unwrap().id().as_str(), "a");
    assert!(matches!(
        ctl.play_index(5),
        Err(PlaybackError::OutOfRange { index: 5, len: 2 })
    ));
}

#[test]
fn ended_state_held_for_five_ticks_advances_once() {
    let (ctl, backend) = manual();
    ctl.replace_queue(vec![t("a", 30), t("b", 45), t("c", 20)]);
    ctl.play_index(0).unwrap();
    backend.set_state(BackendState::Ended);

    let advances = (0..5)
        .map(|_| ctl.shared.lock().tick())
        .filter(|tick| matches!(tick, Tick::Advance(_)))
        .count();
    assert_eq!(advances, 1);
    assert_eq!(ctl.transport(), TransportState::Playing);
}

#[test]
fn paused_session_is_not_sampled_for_end() {
    let (ctl, backend) = manual();
    ctl.replace_queue(vec![t("a", 30), t("b", 45)]);
    ctl.play_index(0).unwrap();
    ctl.pause_resume().unwrap();
    backend.set_state(BackendState::Ended);

    assert_eq!(ctl.shared.lock().tick(), Tick::Idle);
    ctl.stop();
    assert_eq!(ctl.shared.lock().tick(), Tick::Exit);
}

#[test]
fn track_end_moves_to_next_queue_entry() {
    let (ctl, backend) = fast();
    let queue = vec![t("t1", 30), t("t2", 45)];
    ctl.replace_queue(queue.clone());
    ctl.play_index(0).unwrap();
    backend.set_state(BackendState::Ended);

    assert!(wait_until(|| ctl
        .current_track()
        .is_some_and(|c| c.is_same(&queue[1]))));
    assert_eq!(ctl.transport(), TransportState::Playing);
    assert_eq!(ctl.queue_current().unwrap().id().as_str(), "t2");
    assert_eq!(
        backend.loads(),
        vec!["/music/t1.flac".to_string(), "/music/t2.flac".to_string()]
    );
}

#[test]
fn end_of_last_track_stops_the_session() {
    let (ctl, backend) = fast();
    ctl.replace_queue(vec![t("only", 30)]);
    ctl.play_index(0).unwrap();
    backend.set_state(BackendState::Ended);

    assert!(wait_until(|| ctl.transport() == TransportState::Stopped));
    assert!(ctl.current_track().is_none());
    assert_eq!(backend.loads().len(), 1);
    assert!(wait_until(|| !ctl.poller_running()));
}

#[test]
fn disabled_auto_advance_stops_at_track_end() {
    let (ctl, backend) = manual();
    ctl.set_auto_advance(false);
    ctl.replace_queue(vec![t("a", 30), t("b", 45)]);
    ctl.play_index(0).unwrap();
    backend.set_state(BackendState::Ended);

    assert_eq!(ctl.shared.lock().tick(), Tick::Exit);
    assert_eq!(ctl.transport(), TransportState::Stopped);
    assert_eq!(backend.loads().len(), 1);
}

#[test]
fn auto_advance_skips_tracks_without_stream() {
    let (ctl, backend) = fast();
    ctl.replace_queue(vec![t("a", 30), unplayable("gone"), t("c", 20)]);
    ctl.play_index(0).unwrap();
    backend.set_state(BackendState::Ended);

    assert!(wait_until(|| ctl
        .current_track()
        .is_some_and(|c| c.id().as_str() == "c")));
    assert_eq!(
        backend.loads(),
        vec!["/music/a.flac".to_string(), "/music/c.flac".to_string()]
    );
    assert_eq!(ctl.queue().1, 2);
}

#[test]
fn stale_advance_is_ignored_after_manual_play() {
    let (ctl, backend) = manual();
    ctl.replace_queue(vec![t("a", 30), t("b", 45)]);
    ctl.play_index(0).unwrap();
    backend.set_state(BackendState::Ended);

    let generation = match ctl.shared.lock().tick() {
        Tick::Advance(g) => g,
        other => panic!("expected advance, got {other:?}"),
    };
    ctl.play(t("manual", 60)).unwrap();
    super::poller::advance_after_end(&ctl.shared, generation);

    assert_eq!(ctl.current_track().unwrap().id().as_str(), "manual");
    assert_eq!(ctl.queue().1, 0);
}

#[test]
fn poller_exits_after_stop_and_restarts_on_play() {
    let (ctl, _backend) = fast();
    ctl.play(t("a", 30)).unwrap();
    assert!(ctl.poller_running());

    ctl.stop();
    assert!(wait_until(|| !ctl.poller_running()));

    ctl.play(t("b", 30)).unwrap();
    assert!(ctl.poller_running());
    ctl.stop();
}

#[test]
fn volume_is_clamped_and_mute_restores() {
    let (ctl, backend) = manual();
    assert_eq!(ctl.set_volume(150), 100);
    assert_eq!(ctl.set_volume(-5), 0);
    assert_eq!(ctl.set_volume(40), 40);
    assert_eq!(ctl.adjust_volume(10), 50);

    assert_eq!(ctl.toggle_mute(), 0);
    assert_eq!(ctl.progress().volume, 0);
    assert_eq!(ctl.toggle_mute(), 50);

    assert_eq!(
        backend.calls(),
        vec![
            Call::Volume(100),
            Call::Volume(0),
            Call::Volume(40),
            Call::Volume(50),
            Call::Volume(0),
            Call::Volume(50),
        ]
    );

    ctl.play(t("a", 10)).unwrap();
    assert!(backend.calls().contains(&Call::Volume(50)));
}

#[test]
fn auto_advance_skips_tracks_the_backend_cannot_open() {
    let (ctl, backend) = fast();
    backend.mark_corrupt("/music/broken.flac");
    ctl.replace_queue(vec![t("a", 30), t("broken", 30), t("c", 20)]);
    ctl.play_index(0).unwrap();
    backend.set_state(BackendState::Ended);

    assert!(wait_until(|| ctl
        .current_track()
        .is_some_and(|c| c.id().as_str() == "c")));
    assert_eq!(ctl.transport(), TransportState::Playing);
    assert_eq!(
        backend.loads(),
        vec![
            "/music/a.flac".to_string(),
            "/music/broken.flac".to_string(),
            "/music/c.flac".to_string()
        ]
    );
}

#[test]
fn pause_during_advance_delay_keeps_the_track() {
    let (ctl, backend) = manual();
    ctl.replace_queue(vec![t("a", 30), t("b", 45)]);
    ctl.play_index(0).unwrap();
    backend.set_state(BackendState::Ended);

    let generation = match ctl.shared.lock().tick() {
        Tick::Advance(g) => g,
        other => panic!("expected advance, got {other:?}"),
    };
    ctl.pause_resume().unwrap();
    super::poller::advance_after_end(&ctl.shared, generation);

    assert_eq!(ctl.transport(), TransportState::Paused);
    assert_eq!(ctl.current_track().unwrap().id().as_str(), "a");
    assert_eq!(backend.loads().len(), 1);

    // After resuming, the still-ended track is detected again.
    ctl.pause_resume().unwrap();
    backend.set_state(BackendState::Ended);
    assert!(matches!(ctl.shared.lock().tick(), Tick::Advance(_)));
}

#[test]
fn concurrent_volume_steps_are_not_lost() {
    let (ctl, _backend) = manual();
    ctl.set_volume(0);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ctl = ctl.clone();
            thread::spawn(move || {
                for _ in 0..20 {
                    ctl.adjust_volume(1);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(ctl.progress().volume, 80);
}
