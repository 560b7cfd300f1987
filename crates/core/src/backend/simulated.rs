use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use tracing::debug;

use super::{AudioBackend, PlaybackState};
use crate::{ResolutionError, ResourceKey};

/// Command received by a [`SimulatedBackend`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Resolve { key: String },
    Start { handle: u64, at: f64, loop_count: i64 },
    Pause { handle: u64 },
    Stop { handle: u64 },
    Rewind { handle: u64 },
    Release { handle: u64 },
}

/// Handle issued by [`SimulatedBackend`]. Deliberately not `Clone`.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SimHandle {
    id: u64,
}

impl SimHandle {
    /// Identifier used in [`BackendCall`] entries.
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone)]
enum Resource {
    Readable { duration: f64 },
    Unreadable { reason: String },
}

#[derive(Debug)]
struct Voice {
    duration: f64,
    state: PlaybackState,
    position: f64,
    start_at: f64,
    loops_remaining: i64,
}

impl Voice {
    fn advance(&mut self, from: f64, to: f64) {
        if self.state != PlaybackState::Playing {
            return;
        }

        let begin = from.max(self.start_at);
        if to <= begin {
            return;
        }

        // Zero-length sounds finish at once unless they loop forever.
        if self.duration <= 0.0 {
            if self.loops_remaining >= 0 {
                self.state = PlaybackState::Idle;
            }
            self.position = 0.0;
            return;
        }

        self.position += to - begin;
        if self.position < self.duration {
            return;
        }

        let wraps = (self.position / self.duration).floor();
        if self.loops_remaining < 0 {
            self.position = self.position.rem_euclid(self.duration);
            return;
        }
        if wraps > self.loops_remaining as f64 {
            self.state = PlaybackState::Idle;
            self.position = 0.0;
            return;
        }
        self.loops_remaining -= wraps as i64;
        self.position = self.position.rem_euclid(self.duration);
    }
}

#[derive(Debug, Default)]
struct SimState {
    now: f64,
    resources: HashMap<String, Resource>,
    voices: HashMap<u64, Voice>,
    next_id: u64,
    calls: Vec<BackendCall>,
    queries: usize,
    accepted_starts: usize,
}

/// In-process backend with a manual clock.
///
/// Nothing is decoded or rendered; each handle tracks a position that moves
/// forward when [`SimulatedBackend::advance`] is called. By default a start
/// command on a handle that is already playing is dropped, which is how the
/// platform players this crate targets behave.
#[derive(Debug, Default)]
pub struct SimulatedBackend {
    restart_while_playing: bool,
    state: Mutex<SimState>,
}

impl SimulatedBackend {
    /// Creates a backend that drops starts on busy handles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that restarts busy handles from the beginning when
    /// they are started again.
    pub fn restarting() -> Self {
        Self {
            restart_while_playing: true,
            ..Self::default()
        }
    }

    /// Makes `name` resolvable with the given length in seconds.
    pub fn register(&self, name: impl Into<String>, duration_seconds: f64) {
        self.lock().resources.insert(
            name.into(),
            Resource::Readable {
                duration: duration_seconds.max(0.0),
            },
        );
    }

    /// Makes `name` resolve to [`ResolutionError::Unreadable`].
    pub fn register_unreadable(&self, name: impl Into<String>, reason: impl Into<String>) {
        self.lock().resources.insert(
            name.into(),
            Resource::Unreadable {
                reason: reason.into(),
            },
        );
    }

    /// Moves the clock forward, progressing every playing handle.
    pub fn advance(&self, seconds: f64) {
        let mut state = self.lock();
        let from = state.now;
        let to = (from + seconds).max(from);
        state.now = to;
        for voice in state.voices.values_mut() {
            voice.advance(from, to);
        }
    }

    /// Current simulated time in seconds.
    pub fn now(&self) -> f64 {
        self.lock().now
    }

    /// Every command received so far.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    /// Number of clock and state reads, which are not journaled as calls.
    pub fn query_count(&self) -> usize {
        self.lock().queries
    }

    /// Number of start commands that actually (re)started playback.
    pub fn accepted_starts(&self) -> usize {
        self.lock().accepted_starts
    }

    /// Handles that were resolved and not yet released.
    pub fn live_handles(&self) -> usize {
        self.lock().voices.len()
    }

    /// Playback position of a live handle in seconds.
    pub fn position_of(&self, handle: u64) -> Option<f64> {
        self.lock().voices.get(&handle).map(|voice| voice.position)
    }

    /// Playback state of a live handle.
    pub fn state_of(&self, handle: u64) -> Option<PlaybackState> {
        self.lock().voices.get(&handle).map(|voice| voice.state)
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_voice(&self, call: BackendCall, handle: &SimHandle, f: impl FnOnce(&mut Voice)) {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some(voice) = state.voices.get_mut(&handle.id) {
            f(voice);
        }
    }
}

impl AudioBackend for SimulatedBackend {
    type Handle = SimHandle;

    fn resolve(&self, key: &ResourceKey) -> Result<SimHandle, ResolutionError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::Resolve {
            key: key.to_string(),
        });

        let duration = match state.resources.get(key.as_str()) {
            Some(Resource::Readable { duration }) => *duration,
            Some(Resource::Unreadable { reason }) => {
                return Err(ResolutionError::Unreadable {
                    key: key.to_string(),
                    reason: reason.clone(),
                })
            }
            None => {
                return Err(ResolutionError::NotFound {
                    key: key.to_string(),
                })
            }
        };

        state.next_id += 1;
        let id = state.next_id;
        state.voices.insert(
            id,
            Voice {
                duration,
                state: PlaybackState::Idle,
                position: 0.0,
                start_at: 0.0,
                loops_remaining: 0,
            },
        );
        Ok(SimHandle { id })
    }

    fn start(&self, handle: &SimHandle, at: f64, loop_count: i64) {
        let mut state = self.lock();
        state.calls.push(BackendCall::Start {
            handle: handle.id,
            at,
            loop_count,
        });

        let restart = self.restart_while_playing;
        let Some(voice) = state.voices.get_mut(&handle.id) else {
            return;
        };
        match voice.state {
            PlaybackState::Playing if !restart => {
                debug!(handle = handle.id, "start ignored, handle already playing");
                return;
            }
            PlaybackState::Playing => voice.position = 0.0,
            PlaybackState::Idle | PlaybackState::Paused => {}
        }
        voice.state = PlaybackState::Playing;
        voice.start_at = at;
        voice.loops_remaining = loop_count;
        state.accepted_starts += 1;
    }

    fn pause(&self, handle: &SimHandle) {
        self.with_voice(BackendCall::Pause { handle: handle.id }, handle, |voice| {
            if voice.state == PlaybackState::Playing {
                voice.state = PlaybackState::Paused;
            }
        });
    }

    fn stop(&self, handle: &SimHandle) {
        self.with_voice(BackendCall::Stop { handle: handle.id }, handle, |voice| {
            voice.state = PlaybackState::Idle;
            voice.position = 0.0;
        });
    }

    fn rewind(&self, handle: &SimHandle) {
        self.with_voice(BackendCall::Rewind { handle: handle.id }, handle, |voice| {
            voice.position = 0.0;
        });
    }

    fn current_clock_time(&self) -> f64 {
        let mut state = self.lock();
        state.queries += 1;
        state.now
    }

    fn playback_state(&self, handle: &SimHandle) -> PlaybackState {
        let mut state = self.lock();
        state.queries += 1;
        state
            .voices
            .get(&handle.id)
            .map(|voice| voice.state)
            .unwrap_or_default()
    }

    fn release(&self, handle: SimHandle) {
        let mut state = self.lock();
        state.calls.push(BackendCall::Release { handle: handle.id });
        state.voices.remove(&handle.id);
    }
}
