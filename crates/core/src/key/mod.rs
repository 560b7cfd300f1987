use std::{borrow::Cow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{AudioFeedbackError, Result};

mod catalog;

pub use catalog::SoundCatalog;

/// Typed identifier for a sound resource, usually a file name such as
/// `"Tap.mp3"`.
///
/// Keys only carry a name. Whether the resource exists is decided by the
/// backend when the key is resolved.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey(Cow<'static, str>);

impl ResourceKey {
    /// Creates a key from a runtime string, rejecting blank names.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AudioFeedbackError::EmptyKey);
        }
        Ok(Self(Cow::Owned(name)))
    }

    /// Creates a key from a literal. Usable in `const` items, where an empty
    /// literal fails to compile.
    ///
    /// ```
    /// use audio_feedback_core::ResourceKey;
    ///
    /// const TAP: ResourceKey = ResourceKey::from_static("Tap.mp3");
    /// assert_eq!(TAP.as_str(), "Tap.mp3");
    /// ```
    pub const fn from_static(name: &'static str) -> Self {
        assert!(!name.is_empty(), "resource key must not be empty");
        Self(Cow::Borrowed(name))
    }

    /// Returns the underlying resource name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ResourceKey {
    type Err = AudioFeedbackError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResourceKey {
    type Error = AudioFeedbackError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ResourceKey> for String {
    fn from(value: ResourceKey) -> Self {
        value.0.into_owned()
    }
}
