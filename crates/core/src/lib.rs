//! Core library for trigger-driven sound feedback.
//!
//! A [`SoundController`] owns at most one loaded sound and turns UI events
//! (taps, value changes, conditions becoming true) into start commands for
//! an [`AudioBackend`]. Loading, decoding and output are entirely the
//! backend's job; this crate only decides when a handle is loaded, started,
//! paused, rewound and released.

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod feedback;
pub mod key;
pub mod one_shot;
pub mod policy;

pub use backend::{AudioBackend, BackendCall, PlaybackState, SimHandle, SimulatedBackend};
pub use config::{AppConfig, SoundEntry};
pub use controller::{ControllerState, SoundController};
pub use error::{AudioFeedbackError, ResolutionError, Result};
pub use feedback::{
    ChangeFeedback, ConditionalFeedback, DisappearAction, FeedbackBinding, TapFeedback,
};
pub use key::{ResourceKey, SoundCatalog};
pub use one_shot::OneShotPlayer;
pub use policy::{PlaybackPolicy, RepeatMode, Retrigger, INFINITE_LOOPS};
