//! Contract between controllers and whatever actually produces sound.
//!
//! A backend loads named resources into handles and schedules playback on
//! its own clock. Controllers only issue commands; they never observe the
//! backend's audio thread.

use crate::{ResolutionError, ResourceKey};

mod simulated;

pub use simulated::{BackendCall, SimHandle, SimulatedBackend};

/// Playback state of a bound handle as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Loaded and positioned, not playing.
    #[default]
    Idle,
    /// Playing or scheduled to play.
    Playing,
    /// Halted with the position retained.
    Paused,
}

/// Capability set consumed by [`SoundController`](crate::SoundController)
/// and [`OneShotPlayer`](crate::OneShotPlayer).
///
/// Commands are fire-and-forget. A backend that cannot honour one (for
/// example a start on a handle that is still playing) ignores it.
pub trait AudioBackend {
    /// Loaded, playable sound. Owned by exactly one caller until it is
    /// passed back to [`AudioBackend::release`].
    type Handle;

    /// Loads `key` into a new handle.
    fn resolve(&self, key: &ResourceKey) -> Result<Self::Handle, ResolutionError>;

    /// Schedules playback at backend time `at`. A `loop_count` of
    /// [`INFINITE_LOOPS`](crate::INFINITE_LOOPS) repeats forever, any other
    /// value is the number of repeats after the first play.
    fn start(&self, handle: &Self::Handle, at: f64, loop_count: i64);

    /// Halts playback, keeping the current position.
    fn pause(&self, handle: &Self::Handle);

    /// Halts playback and rewinds to the start.
    fn stop(&self, handle: &Self::Handle);

    /// Moves the position back to the start without changing whether the
    /// handle is playing.
    fn rewind(&self, handle: &Self::Handle);

    /// Current backend clock in seconds.
    fn current_clock_time(&self) -> f64;

    fn playback_state(&self, handle: &Self::Handle) -> PlaybackState;

    /// Frees everything tied to `handle`.
    fn release(&self, handle: Self::Handle);
}
