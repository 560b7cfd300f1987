use std::{collections::HashMap, sync::Arc};

use tracing::warn;

use crate::{AudioBackend, AudioFeedbackError, PlaybackPolicy, ResourceKey, Result, SoundController};

#[derive(Debug, Clone)]
struct CatalogEntry {
    key: ResourceKey,
    policy: PlaybackPolicy,
}

/// Symbolic names for sounds used across an application, e.g. `"tap"` for
/// `Tap.mp3`.
#[derive(Debug, Default, Clone)]
pub struct SoundCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl SoundCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers `name` with the default policy, replacing any earlier entry.
    pub fn register(&mut self, name: impl Into<String>, key: ResourceKey) {
        self.register_with_policy(name, key, PlaybackPolicy::default());
    }

    /// Registers `name` with an explicit policy, replacing any earlier entry.
    pub fn register_with_policy(
        &mut self,
        name: impl Into<String>,
        key: ResourceKey,
        policy: PlaybackPolicy,
    ) {
        self.entries.insert(name.into(), CatalogEntry { key, policy });
    }

    /// Key registered under `name`.
    pub fn key(&self, name: &str) -> Option<&ResourceKey> {
        self.entries.get(name).map(|entry| &entry.key)
    }

    /// Policy registered under `name`.
    pub fn policy(&self, name: &str) -> Option<&PlaybackPolicy> {
        self.entries.get(name).map(|entry| &entry.policy)
    }

    /// Like [`SoundCatalog::key`] but reports unknown names as an error.
    pub fn require(&self, name: &str) -> Result<&ResourceKey> {
        self.key(name)
            .ok_or_else(|| AudioFeedbackError::UnknownSound(name.to_string()))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered sounds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no sound is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds a controller for `name` with its registered policy. Unknown
    /// names produce an empty controller.
    pub fn controller<B: AudioBackend>(&self, name: &str, backend: Arc<B>) -> SoundController<B> {
        match self.entries.get(name) {
            Some(entry) => SoundController::new(entry.key.clone(), entry.policy, backend),
            None => {
                warn!(name, "sound is not in the catalog");
                SoundController::empty()
            }
        }
    }
}
