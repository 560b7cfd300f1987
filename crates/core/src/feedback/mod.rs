//! Lifecycle wiring between UI events and a [`SoundController`].
//!
//! Each adapter is meant to live in the state of one UI component. The host
//! framework calls `on_appear` when the component is mounted,
//! `on_disappear` when it goes away, and the adapter-specific method
//! (`tap`, `observe`, `check`) whenever its event source fires. The
//! controller stays empty, and every event is ignored, while the component is
//! not mounted.

use std::sync::Arc;

use tracing::debug;

use crate::{AudioBackend, PlaybackPolicy, ResourceKey, Retrigger, SoundController};

/// What happens to a playing sound when its component disappears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisappearAction {
    /// Pause, keeping the position.
    Stop,
    /// Halt and rewind.
    #[default]
    Reset,
}

/// Sound, policy and controller shared by every adapter.
///
/// The default policy restarts the sound on every trigger so that quick
/// successive events are each audible.
#[derive(Debug)]
pub struct FeedbackBinding<B: AudioBackend> {
    key: ResourceKey,
    policy: PlaybackPolicy,
    disappear: DisappearAction,
    controller: SoundController<B>,
}

impl<B: AudioBackend> FeedbackBinding<B> {
    /// Creates an unmounted binding for `key`.
    pub fn new(key: ResourceKey) -> Self {
        Self {
            key,
            policy: PlaybackPolicy::default().with_retrigger(Retrigger::Restart),
            disappear: DisappearAction::default(),
            controller: SoundController::empty(),
        }
    }

    /// Replaces the playback policy used once mounted.
    pub fn with_policy(mut self, policy: PlaybackPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Chooses what happens to the sound on disappear.
    pub fn with_disappear_action(mut self, action: DisappearAction) -> Self {
        self.disappear = action;
        self
    }

    /// Binds the sound through `backend`.
    pub fn on_appear(&mut self, backend: &Arc<B>) {
        debug!(key = %self.key, "feedback appeared");
        self.controller
            .rebind(self.key.clone(), self.policy, Arc::clone(backend));
    }

    /// Stops or resets the sound according to the disappear action.
    pub fn on_disappear(&mut self) {
        debug!(key = %self.key, action = ?self.disappear, "feedback disappeared");
        match self.disappear {
            DisappearAction::Stop => self.controller.stop(),
            DisappearAction::Reset => self.controller.reset(),
        }
    }

    /// Triggers the sound. Ignored while unmounted.
    pub fn fire(&mut self) {
        self.controller.trigger();
    }

    /// Key of the bound sound.
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// The underlying controller.
    pub fn controller(&self) -> &SoundController<B> {
        &self.controller
    }

    /// Mutable access to the underlying controller.
    pub fn controller_mut(&mut self) -> &mut SoundController<B> {
        &mut self.controller
    }
}

/// Plays the sound whenever the component is tapped.
#[derive(Debug)]
pub struct TapFeedback<B: AudioBackend> {
    binding: FeedbackBinding<B>,
}

impl<B: AudioBackend> TapFeedback<B> {
    /// Wraps `binding`.
    pub fn new(binding: FeedbackBinding<B>) -> Self {
        Self { binding }
    }

    /// Binds the sound through `backend`.
    pub fn on_appear(&mut self, backend: &Arc<B>) {
        self.binding.on_appear(backend);
    }

    /// Stops or resets the sound according to the disappear action.
    pub fn on_disappear(&mut self) {
        self.binding.on_disappear();
    }

    /// Plays the sound for a tap.
    pub fn tap(&mut self) {
        self.binding.fire();
    }

    /// The wrapped binding.
    pub fn binding(&self) -> &FeedbackBinding<B> {
        &self.binding
    }
}

/// Plays the sound whenever a watched value changes.
#[derive(Debug)]
pub struct ChangeFeedback<B: AudioBackend, T> {
    binding: FeedbackBinding<B>,
    last: Option<T>,
}

impl<B: AudioBackend, T: PartialEq> ChangeFeedback<B, T> {
    /// Wraps `binding`.
    pub fn new(binding: FeedbackBinding<B>) -> Self {
        Self {
            binding,
            last: None,
        }
    }

    /// Binds the sound and records the value the component mounted with.
    /// Mounting never plays the sound.
    pub fn on_appear(&mut self, backend: &Arc<B>, initial: T) {
        self.binding.on_appear(backend);
        self.last = Some(initial);
    }

    /// Stops or resets the sound according to the disappear action.
    pub fn on_disappear(&mut self) {
        self.binding.on_disappear();
    }

    /// Records `value`, triggering if it differs from the previous one.
    /// Returns whether a trigger was issued.
    pub fn observe(&mut self, value: T) -> bool {
        let changed = self.last.as_ref().is_some_and(|last| *last != value);
        self.last = Some(value);
        if changed {
            self.binding.fire();
        }
        changed
    }

    /// The wrapped binding.
    pub fn binding(&self) -> &FeedbackBinding<B> {
        &self.binding
    }
}

/// Plays the sound when a condition becomes true.
#[derive(Debug)]
pub struct ConditionalFeedback<B: AudioBackend> {
    binding: FeedbackBinding<B>,
    last: bool,
    play_on_appear: bool,
}

impl<B: AudioBackend> ConditionalFeedback<B> {
    /// Wraps `binding`.
    pub fn new(binding: FeedbackBinding<B>) -> Self {
        Self {
            binding,
            last: false,
            play_on_appear: true,
        }
    }

    /// Whether mounting with the condition already true plays the sound.
    pub fn play_on_appear(mut self, enabled: bool) -> Self {
        self.play_on_appear = enabled;
        self
    }

    /// Binds the sound and plays it if `condition` already holds.
    pub fn on_appear(&mut self, backend: &Arc<B>, condition: impl FnOnce() -> bool) {
        self.binding.on_appear(backend);
        self.last = condition();
        if self.last && self.play_on_appear {
            self.binding.fire();
        }
    }

    /// Stops or resets the sound according to the disappear action.
    pub fn on_disappear(&mut self) {
        self.binding.on_disappear();
    }

    /// Evaluates `condition` and triggers on a false to true transition.
    /// Returns whether a trigger was issued.
    pub fn check(&mut self, condition: impl FnOnce() -> bool) -> bool {
        let current = condition();
        let rising = current && !self.last;
        self.last = current;
        if rising {
            self.binding.fire();
        }
        rising
    }

    /// The wrapped binding.
    pub fn binding(&self) -> &FeedbackBinding<B> {
        &self.binding
    }
}
