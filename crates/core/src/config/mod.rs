use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{PlaybackPolicy, RepeatMode, ResourceKey, Result, Retrigger, SoundCatalog};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sounds: BTreeMap<String, SoundEntry>,
}

impl AppConfig {
    /// A small catalog used when no configuration file is given.
    pub fn demo() -> Self {
        let mut sounds = BTreeMap::new();
        sounds.insert("tap".to_string(), SoundEntry::new("Tap.mp3"));
        sounds.insert(
            "alarm".to_string(),
            SoundEntry {
                repeat: RepeatMode::Loop,
                ..SoundEntry::new("Alarm.wav")
            },
        );
        sounds.insert(
            "chime".to_string(),
            SoundEntry {
                delay_seconds: 0.25,
                repeat: RepeatMode::Count(2),
                retrigger: Retrigger::Restart,
                ..SoundEntry::new("Chime.wav")
            },
        );
        Self { sounds }
    }

    /// Parses a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Validates every entry and builds the catalog.
    pub fn catalog(&self) -> Result<SoundCatalog> {
        let mut catalog = SoundCatalog::new();
        for (name, entry) in &self.sounds {
            catalog.register_with_policy(name.clone(), entry.key()?, entry.policy()?);
        }
        Ok(catalog)
    }
}

/// One named sound in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundEntry {
    pub file: String,
    #[serde(default)]
    pub delay_seconds: f64,
    #[serde(default)]
    pub repeat: RepeatMode,
    #[serde(default)]
    pub retrigger: Retrigger,
}

impl SoundEntry {
    /// Entry for `file` with the default policy.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            delay_seconds: 0.0,
            repeat: RepeatMode::default(),
            retrigger: Retrigger::default(),
        }
    }

    /// Validated key for the entry's file.
    pub fn key(&self) -> Result<ResourceKey> {
        ResourceKey::new(self.file.as_str())
    }

    /// Validated playback policy for the entry.
    pub fn policy(&self) -> Result<PlaybackPolicy> {
        Ok(PlaybackPolicy::new(self.delay_seconds, self.repeat)?.with_retrigger(self.retrigger))
    }
}
