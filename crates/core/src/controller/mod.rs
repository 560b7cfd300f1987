use std::{fmt, sync::Arc};

use tracing::{debug, error, trace, warn};

use crate::{
    AudioBackend, PlaybackPolicy, PlaybackState, ResolutionError, ResourceKey, Retrigger,
};

/// Observable state of a [`SoundController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// No handle is bound. Every operation is a no-op.
    Empty,
    /// A handle is bound and the backend reports the given playback state.
    Bound(PlaybackState),
}

struct Bound<H> {
    key: ResourceKey,
    handle: H,
}

/// Owns at most one backend handle and turns triggers into start commands.
///
/// Loading failures never surface as errors. A controller whose resource
/// could not be resolved stays empty and silently ignores every call until it
/// is given a new key, so a missing sound can never interrupt the flow that
/// triggered it.
///
/// Triggering a sound that is still playing issues another start command.
/// With [`Retrigger::Absorb`] the backend decides what happens and most
/// platform players drop it. Call [`SoundController::reset`] first, or use
/// [`Retrigger::Restart`], when every trigger must be heard.
///
/// Controllers are meant to be driven from a single thread, typically the UI
/// thread that owns them.
pub struct SoundController<B: AudioBackend> {
    backend: Option<Arc<B>>,
    policy: PlaybackPolicy,
    bound: Option<Bound<B::Handle>>,
    resolution_error: Option<ResolutionError>,
}

impl<B: AudioBackend> SoundController<B> {
    /// Resolves `key` and binds the resulting handle. On failure the
    /// controller is empty and the error is logged.
    pub fn new(key: ResourceKey, policy: PlaybackPolicy, backend: Arc<B>) -> Self {
        let mut controller = Self {
            backend: Some(backend),
            policy,
            bound: None,
            resolution_error: None,
        };
        controller.bind(key);
        controller
    }

    /// Creates a controller with nothing bound, to be filled in later with
    /// [`SoundController::rebind`].
    pub fn empty() -> Self {
        Self {
            backend: None,
            policy: PlaybackPolicy::default(),
            bound: None,
            resolution_error: None,
        }
    }

    /// Starts playback `policy.delay()` from now with the policy's loop count.
    pub fn trigger(&mut self) {
        let (Some(backend), Some(bound)) = (&self.backend, &self.bound) else {
            trace!("trigger on empty sound controller");
            return;
        };

        if self.policy.retrigger() == Retrigger::Restart
            && backend.playback_state(&bound.handle) != PlaybackState::Idle
        {
            backend.rewind(&bound.handle);
        }

        let at = backend.current_clock_time() + self.policy.delay_seconds();
        let loop_count = self.policy.loop_count();
        debug!(key = %bound.key, at, loop_count, "starting sound");
        backend.start(&bound.handle, at, loop_count);
    }

    /// Alias for [`SoundController::trigger`].
    pub fn play(&mut self) {
        self.trigger();
    }

    /// Pauses playback, keeping the position.
    pub fn stop(&mut self) {
        if let (Some(backend), Some(bound)) = (&self.backend, &self.bound) {
            backend.pause(&bound.handle);
        }
    }

    /// Halts playback and rewinds to the start. Calling this before
    /// [`SoundController::trigger`] guarantees playback starts from zero.
    pub fn reset(&mut self) {
        if let (Some(backend), Some(bound)) = (&self.backend, &self.bound) {
            backend.stop(&bound.handle);
        }
    }

    /// Rewinds to the start without pausing.
    pub fn rewind(&mut self) {
        if let (Some(backend), Some(bound)) = (&self.backend, &self.bound) {
            backend.rewind(&bound.handle);
        }
    }

    /// Replaces the bound sound, keeping the backend and policy. The previous
    /// handle is released before the new key is resolved.
    pub fn set(&mut self, key: ResourceKey) {
        self.release();
        if self.backend.is_none() {
            warn!(%key, "sound controller has no backend, staying empty");
            return;
        }
        self.bind(key);
    }

    /// Replaces the sound, policy and backend in one go.
    pub fn rebind(&mut self, key: ResourceKey, policy: PlaybackPolicy, backend: Arc<B>) {
        self.release();
        self.backend = Some(backend);
        self.policy = policy;
        self.bind(key);
    }

    /// Releases the bound handle, leaving the controller empty.
    pub fn clear(&mut self) {
        self.release();
    }

    /// Applies `policy` to subsequent triggers.
    pub fn set_policy(&mut self, policy: PlaybackPolicy) {
        self.policy = policy;
    }

    /// Current state, querying the backend when bound.
    pub fn state(&self) -> ControllerState {
        match (&self.backend, &self.bound) {
            (Some(backend), Some(bound)) => {
                ControllerState::Bound(backend.playback_state(&bound.handle))
            }
            _ => ControllerState::Empty,
        }
    }

    /// Whether no handle is bound.
    pub fn is_empty(&self) -> bool {
        self.bound.is_none()
    }

    /// Key of the bound sound, if any.
    pub fn key(&self) -> Option<&ResourceKey> {
        self.bound.as_ref().map(|bound| &bound.key)
    }

    /// Policy applied to triggers.
    pub fn policy(&self) -> &PlaybackPolicy {
        &self.policy
    }

    /// The error from the most recent failed resolution, cleared on the next
    /// successful one.
    pub fn resolution_error(&self) -> Option<&ResolutionError> {
        self.resolution_error.as_ref()
    }

    fn bind(&mut self, key: ResourceKey) {
        let Some(backend) = &self.backend else {
            return;
        };

        match backend.resolve(&key) {
            Ok(handle) => {
                debug!(%key, "sound bound");
                self.resolution_error = None;
                self.bound = Some(Bound { key, handle });
            }
            Err(err) => {
                error!(%key, error = %err, "unable to load sound, controller left empty");
                self.resolution_error = Some(err);
            }
        }
    }

    fn release(&mut self) {
        self.resolution_error = None;
        let Some(bound) = self.bound.take() else {
            return;
        };
        if let Some(backend) = &self.backend {
            debug!(key = %bound.key, "releasing sound");
            backend.release(bound.handle);
        }
    }
}

impl<B: AudioBackend> Default for SoundController<B> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<B: AudioBackend> Drop for SoundController<B> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<B: AudioBackend> fmt::Debug for SoundController<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundController")
            .field("key", &self.key())
            .field("policy", &self.policy)
            .field("resolution_error", &self.resolution_error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{BackendCall, RepeatMode, SimulatedBackend, INFINITE_LOOPS};

    fn backend() -> Arc<SimulatedBackend> {
        let backend = SimulatedBackend::new();
        backend.register("click.wav", 0.2);
        backend.register("siren.wav", 3.0);
        backend.register("thunder.wav", 5.0);
        Arc::new(backend)
    }

    fn key(name: &str) -> ResourceKey {
        ResourceKey::new(name).unwrap()
    }

    fn starts(backend: &SimulatedBackend) -> Vec<(u64, f64, i64)> {
        backend
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Start {
                    handle,
                    at,
                    loop_count,
                } => Some((handle, at, loop_count)),
                _ => None,
            })
            .collect()
    }

    fn releases(backend: &SimulatedBackend) -> Vec<u64> {
        backend
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Release { handle } => Some(handle),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn click_plays_once_immediately() {
        let backend = backend();
        backend.advance(3.0);
        let mut click =
            SoundController::new(key("click.wav"), PlaybackPolicy::default(), backend.clone());

        click.trigger();

        assert_eq!(starts(&backend), vec![(1, 3.0, 0)]);
        assert_eq!(click.state(), ControllerState::Bound(PlaybackState::Playing));
    }

    #[test]
    fn siren_loops_forever() {
        let backend = backend();
        let policy = PlaybackPolicy::default().with_repeat(RepeatMode::Loop);
        let mut siren = SoundController::new(key("siren.wav"), policy, backend.clone());

        siren.play();

        let (_, _, loop_count) = starts(&backend)[0];
        assert_eq!(loop_count, INFINITE_LOOPS);
    }

    #[test]
    fn repeat_count_is_passed_through_unchanged() {
        let backend = backend();
        let policy = PlaybackPolicy::default().with_repeat(RepeatMode::Count(4));
        let mut click = SoundController::new(key("click.wav"), policy, backend.clone());

        click.trigger();

        assert_eq!(starts(&backend)[0].2, 4);
    }

    #[test]
    fn delay_offsets_start_time() {
        let backend = backend();
        backend.advance(1.0);
        let policy = PlaybackPolicy::default().after(Duration::from_millis(500));
        let mut click = SoundController::new(key("click.wav"), policy, backend.clone());

        click.trigger();

        assert_eq!(starts(&backend)[0].1, 1.5);
    }

    #[test]
    fn missing_sound_leaves_controller_empty_and_silent() {
        let backend = backend();
        let mut missing =
            SoundController::new(key("nope.wav"), PlaybackPolicy::default(), backend.clone());

        assert_eq!(missing.state(), ControllerState::Empty);
        assert!(matches!(
            missing.resolution_error(),
            Some(ResolutionError::NotFound { .. })
        ));

        let calls = backend.calls().len();
        let queries = backend.query_count();
        missing.trigger();
        missing.trigger();
        missing.stop();
        missing.reset();
        missing.rewind();

        assert_eq!(backend.calls().len(), calls);
        assert_eq!(backend.query_count(), queries);
        assert!(missing.is_empty());
    }

    #[test]
    fn unreadable_sound_is_reported_not_raised() {
        let backend = backend();
        backend.register_unreadable("corrupt.wav", "bad header");
        let mut corrupt =
            SoundController::new(key("corrupt.wav"), PlaybackPolicy::default(), backend.clone());

        corrupt.trigger();

        assert!(matches!(
            corrupt.resolution_error(),
            Some(ResolutionError::Unreadable { .. })
        ));
        assert!(starts(&backend).is_empty());
    }

    #[test]
    fn empty_controller_never_touches_anything() {
        let mut controller = SoundController::<SimulatedBackend>::empty();
        controller.trigger();
        controller.stop();
        controller.reset();
        controller.rewind();
        controller.set(key("click.wav"));

        assert_eq!(controller.state(), ControllerState::Empty);
        assert!(controller.key().is_none());
    }

    #[test]
    fn reassignment_releases_previous_handle_first() {
        let backend = backend();
        let mut controller =
            SoundController::new(key("click.wav"), PlaybackPolicy::default(), backend.clone());

        controller.set(key("thunder.wav"));
        controller.set(key("nope.wav"));
        controller.set(key("siren.wav"));

        let calls = backend.calls();
        let release_first = calls
            .iter()
            .position(|call| *call == BackendCall::Release { handle: 1 })
            .unwrap();
        let resolve_thunder = calls
            .iter()
            .position(|call| {
                *call
                    == BackendCall::Resolve {
                        key: "thunder.wav".to_string(),
                    }
            })
            .unwrap();
        assert!(release_first < resolve_thunder);
        assert_eq!(releases(&backend), vec![1, 2]);
        assert_eq!(controller.key().map(ResourceKey::as_str), Some("siren.wav"));
        assert!(controller.resolution_error().is_none());

        drop(controller);
        assert_eq!(releases(&backend), vec![1, 2, 3]);
        assert_eq!(backend.live_handles(), 0);
    }

    #[test]
    fn clear_releases_once() {
        let backend = backend();
        let mut controller =
            SoundController::new(key("click.wav"), PlaybackPolicy::default(), backend.clone());

        controller.clear();
        controller.clear();
        drop(controller);

        assert_eq!(releases(&backend), vec![1]);
    }

    #[test]
    fn rebind_attaches_empty_controller() {
        let backend = backend();
        let mut controller = SoundController::empty();

        controller.rebind(
            key("siren.wav"),
            PlaybackPolicy::default().with_repeat(RepeatMode::Count(1)),
            backend.clone(),
        );
        controller.trigger();

        assert_eq!(starts(&backend), vec![(1, 0.0, 1)]);
    }

    #[test]
    fn stop_pauses_and_keeps_position() {
        let backend = backend();
        let mut thunder =
            SoundController::new(key("thunder.wav"), PlaybackPolicy::default(), backend.clone());

        thunder.trigger();
        backend.advance(2.0);
        thunder.stop();
        backend.advance(1.0);

        assert_eq!(thunder.state(), ControllerState::Bound(PlaybackState::Paused));
        assert_eq!(backend.position_of(1), Some(2.0));
    }

    #[test]
    fn reset_then_trigger_starts_from_zero() {
        let backend = backend();
        let mut thunder =
            SoundController::new(key("thunder.wav"), PlaybackPolicy::default(), backend.clone());

        // from playing
        thunder.trigger();
        backend.advance(2.0);
        thunder.reset();
        assert_eq!(thunder.state(), ControllerState::Bound(PlaybackState::Idle));
        thunder.trigger();
        assert_eq!(backend.position_of(1), Some(0.0));
        assert_eq!(thunder.state(), ControllerState::Bound(PlaybackState::Playing));

        // from paused
        backend.advance(1.0);
        thunder.stop();
        thunder.reset();
        thunder.trigger();
        assert_eq!(backend.position_of(1), Some(0.0));
        assert_eq!(backend.accepted_starts(), 3);
    }

    #[test]
    fn rewind_keeps_playing() {
        let backend = backend();
        let mut thunder =
            SoundController::new(key("thunder.wav"), PlaybackPolicy::default(), backend.clone());

        thunder.trigger();
        backend.advance(2.5);
        thunder.rewind();

        assert_eq!(backend.position_of(1), Some(0.0));
        assert_eq!(thunder.state(), ControllerState::Bound(PlaybackState::Playing));
    }

    #[test]
    fn rapid_retrigger_is_absorbed_by_busy_backend() {
        let backend = backend();
        let mut thunder =
            SoundController::new(key("thunder.wav"), PlaybackPolicy::default(), backend.clone());

        thunder.trigger();
        backend.advance(1.0);
        thunder.trigger();

        assert_eq!(starts(&backend).len(), 2);
        assert_eq!(backend.accepted_starts(), 1);
        assert_eq!(backend.position_of(1), Some(1.0));
    }

    #[test]
    fn restart_policy_replays_from_zero() {
        let backend = backend();
        let policy = PlaybackPolicy::default().with_retrigger(Retrigger::Restart);
        let mut thunder = SoundController::new(key("thunder.wav"), policy, backend.clone());

        thunder.trigger();
        backend.advance(1.0);
        thunder.trigger();

        assert_eq!(backend.position_of(1), Some(0.0));
        let rewinds = backend
            .calls()
            .into_iter()
            .filter(|call| matches!(call, BackendCall::Rewind { .. }))
            .count();
        assert_eq!(rewinds, 1);
    }

    #[test]
    fn restart_policy_rewinds_paused_handles() {
        let backend = backend();
        let policy = PlaybackPolicy::default().with_retrigger(Retrigger::Restart);
        let mut thunder = SoundController::new(key("thunder.wav"), policy, backend.clone());

        thunder.trigger();
        backend.advance(1.0);
        thunder.stop();
        assert_eq!(backend.position_of(1), Some(1.0));
        thunder.trigger();

        let rewinds = backend
            .calls()
            .into_iter()
            .filter(|call| matches!(call, BackendCall::Rewind { .. }))
            .count();
        assert_eq!(rewinds, 1);
        assert_eq!(backend.position_of(1), Some(0.0));
        assert_eq!(thunder.state(), ControllerState::Bound(PlaybackState::Playing));
    }

    #[test]
    fn restart_policy_does_not_rewind_idle_handles() {
        let backend = backend();
        let policy = PlaybackPolicy::default().with_retrigger(Retrigger::Restart);
        let mut click = SoundController::new(key("click.wav"), policy, backend.clone());

        click.trigger();
        backend.advance(1.0);
        click.trigger();

        assert!(!backend
            .calls()
            .iter()
            .any(|call| matches!(call, BackendCall::Rewind { .. })));
        assert_eq!(backend.accepted_starts(), 2);
    }

    #[test]
    fn policy_changes_apply_to_next_trigger() {
        let backend = backend();
        let mut click =
            SoundController::new(key("click.wav"), PlaybackPolicy::default(), backend.clone());

        click.set_policy(PlaybackPolicy::default().with_repeat(RepeatMode::Loop));
        click.trigger();

        assert_eq!(starts(&backend)[0].2, INFINITE_LOOPS);
        assert_eq!(click.policy().repeat(), RepeatMode::Loop);
    }
}
