//! Persistent profile store.
//!
//! The store is a single JSON document at `~/.gh-switch/config.json`:
//!
//! ```json
//! { "profiles": [...], "activeProfile": "work", "version": "1.0.0" }
//! ```
//!
//! Every command does load -> mutate -> save; nothing is cached between
//! invocations. There is no file locking, so two concurrent invocations race
//! and the last writer wins.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fs_utils::atomic_write;
use crate::profiles::Profile;

/// Schema version written into new documents
pub const CONFIG_VERSION: &str = "1.0.0";

/// The persisted store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    /// Profiles in insertion order
    pub profiles: Vec<Profile>,

    /// Name of the active profile. The key is required, the value may be null.
    #[serde(deserialize_with = "nullable")]
    pub active_profile: Option<String>,

    pub version: String,
}

fn nullable<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self {
            profiles: Vec::new(),
            active_profile: None,
            version: CONFIG_VERSION.to_string(),
        }
    }
}

impl ConfigDocument {
    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The profile `active_profile` points at
    pub fn active(&self) -> Option<&Profile> {
        self.active_profile.as_deref().and_then(|name| self.get(name))
    }

    /// Replace a profile with the same name in place, or append it.
    ///
    /// When the store holds exactly one profile afterwards, it becomes active.
    pub fn add_or_update_profile(&mut self, profile: Profile) {
        let name = profile.name.clone();
        match self.profiles.iter_mut().find(|p| p.name == name) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }

        if self.profiles.len() == 1 {
            self.active_profile = Some(name);
        }
    }

    /// Remove a profile.
    ///
    /// If it was active, the first remaining profile becomes active (or none).
    pub fn remove_profile(&mut self, name: &str) -> Result<Profile> {
        let index = self
            .profiles
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        let removed = self.profiles.remove(index);

        if self.active_profile.as_deref() == Some(name) {
            self.active_profile = self.profiles.first().map(|p| p.name.clone());
        }

        Ok(removed)
    }

    pub fn set_active(&mut self, name: &str) -> Result<()> {
        if !self.contains(name) {
            return Err(Error::NotFound(name.to_string()));
        }
        self.active_profile = Some(name.to_string());
        Ok(())
    }

    /// First profile using `path` as its key, skipping the profile named `exclude`
    pub fn find_by_key_path(&self, path: &Path, exclude: Option<&str>) -> Option<&Profile> {
        self.profiles
            .iter()
            .find(|p| p.ssh_key_path == path && Some(p.name.as_str()) != exclude)
    }

    /// Structural checks serde cannot express
    fn check(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if !seen.insert(profile.name.as_str()) {
                return Err(format!("duplicate profile name '{}'", profile.name));
            }
        }

        if let Some(active) = &self.active_profile
            && !seen.contains(active.as_str())
        {
            return Err(format!("activeProfile '{active}' does not name any profile"));
        }

        Ok(())
    }
}

/// Loads and saves the [`ConfigDocument`] at a fixed path
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the document, returning an empty one if the file doesn't exist
    pub fn load(&self) -> Result<ConfigDocument> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no config file, starting empty");
            return Ok(ConfigDocument::default());
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;

        let doc: ConfigDocument = serde_json::from_str(&content)
            .map_err(|e| Error::corrupt(&self.path, e.to_string()))?;
        doc.check().map_err(|reason| Error::corrupt(&self.path, reason))?;

        tracing::debug!(
            path = %self.path.display(),
            profiles = doc.profiles.len(),
            "config loaded"
        );
        Ok(doc)
    }

    /// Write the document atomically, creating parent directories as needed
    pub fn save(&self, doc: &ConfigDocument) -> Result<()> {
        let mut content = serde_json::to_string_pretty(doc)
            .map_err(|e| Error::corrupt(&self.path, e.to_string()))?;
        content.push('\n');

        atomic_write(&self.path, &content)?;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    /// Load, apply `f`, and save if `f` succeeds
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut ConfigDocument) -> Result<T>,
    {
        let mut doc = self.load()?;
        let out = f(&mut doc)?;
        self.save(&doc)?;
        Ok(out)
    }
}
