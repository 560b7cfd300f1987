/// Result alias that carries the custom [`AudioFeedbackError`] type.
pub type Result<T> = std::result::Result<T, AudioFeedbackError>;

/// Common error type for the core crate.
///
/// These errors describe invalid values and configuration. Failures to load a
/// sound are reported separately through [`ResolutionError`] and never escape
/// a [`SoundController`](crate::SoundController).
#[derive(Debug, thiserror::Error)]
pub enum AudioFeedbackError {
    /// Free-form error message.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// A resource key was built from an empty name.
    #[error("resource key must not be empty")]
    EmptyKey,
    /// A playback delay was negative or not a finite number.
    #[error("playback delay must be a finite, non-negative number of seconds (got {seconds})")]
    InvalidDelay { seconds: f64 },
    /// A catalog lookup named a sound that was never registered.
    #[error("unknown sound `{0}`")]
    UnknownSound(String),
}

impl AudioFeedbackError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for AudioFeedbackError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for AudioFeedbackError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

/// Failure to turn a resource key into a playable handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// The backend could not locate the resource.
    #[error("sound `{key}` not found")]
    NotFound { key: String },
    /// The resource exists but could not be decoded.
    #[error("sound `{key}` could not be read: {reason}")]
    Unreadable { key: String, reason: String },
}

impl ResolutionError {
    /// Name of the resource that failed to resolve.
    pub fn key(&self) -> &str {
        match self {
            Self::NotFound { key } | Self::Unreadable { key, .. } => key,
        }
    }
}
