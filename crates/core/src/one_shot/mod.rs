use std::{sync::Arc, time::Duration};

use tracing::{debug, error};

use crate::{AudioBackend, PlaybackState, ResourceKey};

/// Fire-and-forget player for sounds that do not belong to any component.
///
/// Each call to [`OneShotPlayer::play`] loads a fresh handle, so overlapping
/// plays of the same sound are all heard. Handles are kept until
/// [`OneShotPlayer::collect_finished`] sees them idle again.
pub struct OneShotPlayer<B: AudioBackend> {
    backend: Arc<B>,
    active: Vec<B::Handle>,
}

impl<B: AudioBackend> OneShotPlayer<B> {
    /// Creates a player on top of `backend`.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            active: Vec::new(),
        }
    }

    /// Plays `key` once after `delay`. Returns whether playback was
    /// scheduled; load failures are logged.
    pub fn play(&mut self, key: &ResourceKey, delay: Duration) -> bool {
        let handle = match self.backend.resolve(key) {
            Ok(handle) => handle,
            Err(err) => {
                error!(%key, error = %err, "unable to load one-shot sound");
                return false;
            }
        };

        let at = self.backend.current_clock_time() + delay.as_secs_f64();
        self.backend.start(&handle, at, 0);
        self.active.push(handle);
        true
    }

    /// Releases every handle that finished playing and returns how many were
    /// released.
    pub fn collect_finished(&mut self) -> usize {
        let before = self.active.len();
        let (finished, playing): (Vec<_>, Vec<_>) = self
            .active
            .drain(..)
            .partition(|handle| self.backend.playback_state(handle) == PlaybackState::Idle);
        self.active = playing;
        for handle in finished {
            self.backend.release(handle);
        }

        let released = before - self.active.len();
        if released > 0 {
            debug!(released, remaining = self.active.len(), "collected finished sounds");
        }
        released
    }

    /// Number of sounds still held.
    pub fn active(&self) -> usize {
        self.active.len()
    }
}

impl<B: AudioBackend> Drop for OneShotPlayer<B> {
    fn drop(&mut self) {
        for handle in self.active.drain(..) {
            self.backend.release(handle);
        }
    }
}
