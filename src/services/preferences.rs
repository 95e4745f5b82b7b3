//! Preference store for the sound-enabled flag

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Value used when nothing (or nothing readable) was stored
pub const DEFAULT_SOUND_ENABLED: bool = true;

/// Durable storage for the single sound preference.
///
/// Neither operation may fail from the caller's point of view: `load` falls
/// back to the default, `save` logs and drops the error.
pub trait PreferenceStore: Send + Sync {
    fn load(&self) -> bool;
    fn save(&self, sound_enabled: bool);
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for Arc<T> {
    fn load(&self) -> bool {
        (**self).load()
    }

    fn save(&self, sound_enabled: bool) {
        (**self).save(sound_enabled)
    }
}

/// On-disk preference document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub sound_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound_enabled: DEFAULT_SOUND_ENABLED,
        }
    }
}

/// confy-backed store at an explicit path
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> bool {
        match confy::load_path::<Preferences>(&self.path) {
            Ok(preferences) => preferences.sound_enabled,
            Err(e) => {
                warn!("Ignoring unreadable preferences at {}: {}", self.path.display(), e);
                DEFAULT_SOUND_ENABLED
            }
        }
    }

    fn save(&self, sound_enabled: bool) {
        match confy::store_path(&self.path, Preferences { sound_enabled }) {
            Ok(()) => info!("Saved sound preference: {}", sound_enabled),
            Err(e) => warn!("Failed to save sound preference: {}", e),
        }
    }
}

/// In-process store, survives only as long as the value itself
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    value: Mutex<Option<bool>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(sound_enabled: bool) -> Self {
        Self {
            value: Mutex::new(Some(sound_enabled)),
        }
    }

    /// Raw stored value, `None` if never saved
    pub fn stored(&self) -> Option<bool> {
        self.value.lock().ok().and_then(|v| *v)
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> bool {
        self.stored().unwrap_or(DEFAULT_SOUND_ENABLED)
    }

    fn save(&self, sound_enabled: bool) {
        if let Ok(mut value) = self.value.lock() {
            *value = Some(sound_enabled);
        }
    }
}
