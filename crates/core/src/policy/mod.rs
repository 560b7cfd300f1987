use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{AudioFeedbackError, Result};

/// Loop count understood by every backend as "repeat forever".
pub const INFINITE_LOOPS: i64 = -1;

/// How often a sound repeats once started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    /// Repeat until stopped.
    Loop,
    /// Repeat `n` additional times. `Count(0)` plays exactly once.
    Count(u32),
}

impl Default for RepeatMode {
    fn default() -> Self {
        Self::Count(0)
    }
}

impl RepeatMode {
    /// Loop count handed to the backend: [`INFINITE_LOOPS`] for
    /// [`RepeatMode::Loop`], otherwise the number of additional repeats.
    pub fn loop_count(self) -> i64 {
        match self {
            Self::Loop => INFINITE_LOOPS,
            Self::Count(n) => i64::from(n),
        }
    }
}

/// What a trigger does when the sound is already playing or paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retrigger {
    /// Issue the start command as-is and let the backend decide. Backends that
    /// ignore starts on a busy handle drop the trigger.
    #[default]
    Absorb,
    /// Rewind to the beginning before starting, so every trigger is audible
    /// from position zero.
    Restart,
}

/// Delay, repeat and retrigger settings for one controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackPolicy {
    delay: Duration,
    repeat: RepeatMode,
    retrigger: Retrigger,
}

impl PlaybackPolicy {
    /// Creates a policy from a delay in seconds.
    pub fn new(delay_seconds: f64, repeat: RepeatMode) -> Result<Self> {
        let delay = Duration::try_from_secs_f64(delay_seconds).map_err(|_| {
            AudioFeedbackError::InvalidDelay {
                seconds: delay_seconds,
            }
        })?;

        Ok(Self {
            delay,
            repeat,
            retrigger: Retrigger::default(),
        })
    }

    /// Returns a copy that starts playback `delay` after each trigger.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns a copy with the given repeat mode.
    pub fn with_repeat(mut self, repeat: RepeatMode) -> Self {
        self.repeat = repeat;
        self
    }

    /// Returns a copy with the given retrigger behavior.
    pub fn with_retrigger(mut self, retrigger: Retrigger) -> Self {
        self.retrigger = retrigger;
        self
    }

    /// Delay between a trigger and the start of playback.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Delay in seconds, as added to the backend clock.
    pub fn delay_seconds(&self) -> f64 {
        self.delay.as_secs_f64()
    }

    /// Repeat mode applied on every start.
    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    /// Behavior when triggered while busy.
    pub fn retrigger(&self) -> Retrigger {
        self.retrigger
    }

    /// Loop count handed to the backend, see [`RepeatMode::loop_count`].
    pub fn loop_count(&self) -> i64 {
        self.repeat.loop_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_maps_to_additional_repeats() {
        for n in [0, 1, 7, u32::MAX] {
            assert_eq!(RepeatMode::Count(n).loop_count(), i64::from(n));
        }
        assert_eq!(RepeatMode::Loop.loop_count(), INFINITE_LOOPS);
    }

    #[test]
    fn defaults_play_once_immediately() {
        let policy = PlaybackPolicy::default();
        assert_eq!(policy.delay(), Duration::ZERO);
        assert_eq!(policy.repeat(), RepeatMode::Count(0));
        assert_eq!(policy.retrigger(), Retrigger::Absorb);
        assert_eq!(policy.loop_count(), 0);
    }

    #[test]
    fn rejects_negative_and_non_finite_delays() {
        for seconds in [-0.5, f64::NAN, f64::INFINITY] {
            let err = PlaybackPolicy::new(seconds, RepeatMode::Loop).unwrap_err();
            assert!(matches!(err, AudioFeedbackError::InvalidDelay { .. }));
        }

        let policy = PlaybackPolicy::new(1.25, RepeatMode::Count(2)).unwrap();
        assert_eq!(policy.delay_seconds(), 1.25);
        assert_eq!(policy.loop_count(), 2);
    }

    #[test]
    fn repeat_mode_serde_shape() {
        assert_eq!(serde_json::to_string(&RepeatMode::Loop).unwrap(), "\"loop\"");
        let count: RepeatMode = serde_json::from_str("{\"count\":3}").unwrap();
        assert_eq!(count, RepeatMode::Count(3));

        let retrigger: Retrigger = serde_json::from_str("\"restart\"").unwrap();
        assert_eq!(retrigger, Retrigger::Restart);
    }
}
