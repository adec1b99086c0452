use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::widget::{HandleId, ReadySignal, StateCode, WidgetEvent};

use super::sink::{create_sink_at, probe_duration};
use super::{Clock, ClockTable};

/// How often the engine checks sinks for end-of-media when idle.
const TICK: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub(crate) enum EngineCmd {
    /// Decode `path` and register a paused player for `handle`.
    Load {
        handle: HandleId,
        path: PathBuf,
        events: Sender<WidgetEvent>,
    },
    Play(HandleId),
    Pause(HandleId),
    SetVolume(HandleId, u8),
    Seek(HandleId, Duration),
    Destroy(HandleId),
    /// Stop every player and leave the engine thread.
    Shutdown,
}

struct Player {
    path: PathBuf,
    events: Sender<WidgetEvent>,
    sink: Sink,
    paused: bool,
    ended: bool,
    volume: f32,
}

impl Player {
    fn emit(&self, handle: HandleId, state: StateCode) {
        let _ = self.events.send(WidgetEvent::StateChange {
            handle,
            code: state.code(),
        });
    }
}

pub(super) fn spawn_engine(
    rx: Receiver<EngineCmd>,
    clocks: ClockTable,
    ready: ReadySignal,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(err) => {
                ready.failed(format!("no audio output device: {err}"));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the TUI.
        stream.log_on_drop(false);
        ready.ready();

        let mut players: HashMap<HandleId, Player> = HashMap::new();

        loop {
            match rx.recv_timeout(TICK) {
                Ok(EngineCmd::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Ok(cmd) => handle_cmd(cmd, &stream, &mut players, &clocks),
                Err(RecvTimeoutError::Timeout) => {}
            }
            detect_ended(&mut players, &clocks);
        }

        for (_, player) in players.drain() {
            player.sink.stop();
        }
        if let Ok(mut clocks) = clocks.lock() {
            clocks.clear();
        }
        tracing::debug!("widget engine stopped");
    })
}

fn with_clock(clocks: &ClockTable, handle: HandleId, f: impl FnOnce(&mut Clock)) {
    if let Ok(mut clocks) = clocks.lock() {
        if let Some(clock) = clocks.get_mut(&handle) {
            f(clock);
        }
    }
}

fn handle_cmd(
    cmd: EngineCmd,
    stream: &OutputStream,
    players: &mut HashMap<HandleId, Player>,
    clocks: &ClockTable,
) {
    match cmd {
        EngineCmd::Load {
            handle,
            path,
            events,
        } => {
            let (sink, decoded_total) = match create_sink_at(stream, &path, Duration::ZERO) {
                Ok(created) => created,
                Err(err) => {
                    // The widget never becomes ready; the controller just sees silence.
                    tracing::warn!(%handle, %err, "failed to load media");
                    return;
                }
            };
            let duration = probe_duration(&path)
                .or(decoded_total)
                .unwrap_or(Duration::ZERO);

            if let Ok(mut clocks) = clocks.lock() {
                clocks.insert(
                    handle,
                    Clock {
                        duration,
                        ..Clock::default()
                    },
                );
            }

            let player = Player {
                path,
                events,
                sink,
                paused: true,
                ended: false,
                volume: 1.0,
            };
            player.emit(handle, StateCode::Cued);
            let _ = player.events.send(WidgetEvent::Ready { handle });
            players.insert(handle, player);
        }

        EngineCmd::Play(handle) => {
            let Some(player) = players.get_mut(&handle) else {
                return;
            };
            if player.ended {
                // Replaying after the end: rebuild from the start.
                rebuild(stream, handle, player, Duration::ZERO, clocks);
                player.ended = false;
            }
            if player.paused {
                player.sink.play();
                player.paused = false;
                with_clock(clocks, handle, |c| c.started_at = Some(Instant::now()));
            }
            player.emit(handle, StateCode::Playing);
        }

        EngineCmd::Pause(handle) => {
            let Some(player) = players.get_mut(&handle) else {
                return;
            };
            if !player.paused {
                player.sink.pause();
                player.paused = true;
                with_clock(clocks, handle, |c| {
                    if let Some(st) = c.started_at.take() {
                        c.accumulated += st.elapsed();
                    }
                });
            }
            player.emit(handle, StateCode::Paused);
        }

        EngineCmd::SetVolume(handle, percent) => {
            if let Some(player) = players.get_mut(&handle) {
                player.volume = f32::from(percent) / 100.0;
                player.sink.set_volume(player.volume);
            }
        }

        EngineCmd::Seek(handle, at) => {
            let Some(player) = players.get_mut(&handle) else {
                return;
            };
            player.emit(handle, StateCode::Buffering);
            rebuild(stream, handle, player, at, clocks);
            player.ended = false;
            if player.paused {
                player.emit(handle, StateCode::Paused);
            } else {
                player.emit(handle, StateCode::Playing);
            }
        }

        EngineCmd::Destroy(handle) => {
            if let Some(player) = players.remove(&handle) {
                player.sink.stop();
            }
            if let Ok(mut clocks) = clocks.lock() {
                clocks.remove(&handle);
            }
        }

        EngineCmd::Shutdown => {}
    }
}

/// Replace the player's sink with a fresh one positioned at `at`,
/// preserving play/pause state and volume.
fn rebuild(
    stream: &OutputStream,
    handle: HandleId,
    player: &mut Player,
    at: Duration,
    clocks: &ClockTable,
) {
    let (sink, _) = match create_sink_at(stream, &player.path, at) {
        Ok(created) => created,
        Err(err) => {
            tracing::warn!(%handle, %err, "failed to reopen media");
            return;
        }
    };

    player.sink.stop();
    sink.set_volume(player.volume);
    if !player.paused {
        sink.play();
    }
    player.sink = sink;

    let playing = !player.paused;
    with_clock(clocks, handle, |c| {
        c.accumulated = at;
        c.started_at = playing.then(Instant::now);
    });
}

fn detect_ended(players: &mut HashMap<HandleId, Player>, clocks: &ClockTable) {
    for (&handle, player) in players.iter_mut() {
        if player.paused || player.ended || !player.sink.empty() {
            continue;
        }
        player.ended = true;
        player.paused = true;
        with_clock(clocks, handle, |c| {
            c.started_at = None;
            c.accumulated = c.duration;
        });
        player.emit(handle, StateCode::Ended);
    }
}
