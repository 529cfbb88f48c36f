//! Persisted installation state for one scope.
//!
//! The on-disk format is a single JSON document per scope:
//! `installedAgents` (identifier → entry), plus `enabledAgents` /
//! `disabledAgents` override sets. An installed agent with no explicit
//! override is enabled.

use crate::error::{AgentryError, Result};
use crate::storage::Scope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// One installed agent within one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub version: String,
    #[serde(rename = "installedAt")]
    pub installed_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub scope: Scope,
}

/// Root persisted document for one scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "installedAgents", default)]
    pub installed: BTreeMap<String, ManifestEntry>,
    #[serde(rename = "enabledAgents", default)]
    pub enabled: BTreeSet<String>,
    #[serde(rename = "disabledAgents", default)]
    pub disabled: BTreeSet<String>,
}

impl Manifest {
    /// Add or overwrite an entry. A fresh install carries no explicit
    /// override, so any stale override for the identifier is cleared.
    pub fn add_entry(&mut self, id: &str, entry: ManifestEntry) {
        self.installed.insert(id.to_string(), entry);
        self.enabled.remove(id);
        self.disabled.remove(id);
    }

    /// Delete an entry and any overrides for it.
    pub fn remove_entry(&mut self, id: &str) -> Option<ManifestEntry> {
        self.enabled.remove(id);
        self.disabled.remove(id);
        self.installed.remove(id)
    }

    pub fn entry(&self, id: &str) -> Option<&ManifestEntry> {
        self.installed.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.installed.contains_key(id)
    }

    /// Explicit override wins; otherwise installed means enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        if self.enabled.contains(id) {
            return true;
        }
        if self.disabled.contains(id) {
            return false;
        }
        self.installed.contains_key(id)
    }

    /// Record an explicit enable/disable. The identifier never ends up in
    /// both override sets.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) {
        if enabled {
            self.disabled.remove(id);
            self.enabled.insert(id.to_string());
        } else {
            self.enabled.remove(id);
            self.disabled.insert(id.to_string());
        }
    }
}

/// Load/save wrapper owning one scope's manifest file.
///
/// Saves are atomic (temp file + rename). The raw bytes seen at load time
/// are kept so an external change between load and save can be detected;
/// the save still wins (last-writer-wins), but a warning is printed.
pub struct ManifestStore {
    path: PathBuf,
    loaded_raw: Option<String>,
}

impl ManifestStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            loaded_raw: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the manifest, returning an empty one when the file is absent
    /// (first run is not an error). A present-but-corrupt file is.
    pub fn load(&mut self) -> Result<Manifest> {
        if !self.path.exists() {
            self.loaded_raw = None;
            return Ok(Manifest::default());
        }
        let data = std::fs::read_to_string(&self.path)?;
        let manifest: Manifest =
            serde_json::from_str(&data).map_err(|e| AgentryError::ManifestCorrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        self.loaded_raw = Some(data);
        Ok(manifest)
    }

    /// Write the complete document atomically (temp file + rename in the
    /// same directory, so a concurrent load never sees a partial write).
    pub fn save(&mut self, manifest: &Manifest) -> Result<()> {
        if self.externally_changed() {
            eprintln!(
                "Warning: {} changed on disk since it was loaded; overwriting",
                self.path.display()
            );
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(manifest)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &data)?;
        std::fs::rename(&tmp, &self.path)?;
        self.loaded_raw = Some(data);
        Ok(())
    }

    fn externally_changed(&self) -> bool {
        match &self.loaded_raw {
            None => false,
            Some(snapshot) => match std::fs::read_to_string(&self.path) {
                Ok(current) => &current != snapshot,
                Err(_) => true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(version: &str, scope: Scope) -> ManifestEntry {
        ManifestEntry {
            version: version.into(),
            installed_at: Utc::now(),
            updated_at: None,
            scope,
        }
    }

    #[test]
    fn test_load_missing_returns_default() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = ManifestStore::new(tmp.path().join("missing.json"));
        let m = store.load().unwrap();
        assert!(m.installed.is_empty());
        assert!(m.enabled.is_empty());
        assert!(m.disabled.is_empty());
    }

    #[test]
    fn test_load_corrupt_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("manifest.json");
        std::fs::write(&path, "{not json").unwrap();
        let mut store = ManifestStore::new(path);
        assert!(matches!(
            store.load(),
            Err(AgentryError::ManifestCorrupt { .. })
        ));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = ManifestStore::new(tmp.path().join("manifest.json"));

        let mut manifest = Manifest::default();
        manifest.add_entry("alpha", entry("1.0.0", Scope::User));
        manifest.add_entry("beta", entry("2.0.0", Scope::Project));
        manifest.set_enabled("beta", false);

        store.save(&manifest).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn test_wire_field_names() {
        let mut manifest = Manifest::default();
        manifest.add_entry("alpha", entry("1.0.0", Scope::User));
        manifest.set_enabled("alpha", false);

        let json = serde_json::to_string(&manifest).unwrap();
        assert!(json.contains("\"installedAgents\""));
        assert!(json.contains("\"enabledAgents\""));
        assert!(json.contains("\"disabledAgents\""));
        assert!(json.contains("\"installedAt\""));
        assert!(json.contains("\"scope\":\"user\""));
        // updatedAt is omitted until an update happens.
        assert!(!json.contains("updatedAt"));
    }

    #[test]
    fn test_mutual_exclusion_after_toggling() {
        let mut m = Manifest::default();
        m.add_entry("a", entry("1.0.0", Scope::User));
        for enabled in [false, true, true, false, true] {
            m.set_enabled("a", enabled);
            assert!(!(m.enabled.contains("a") && m.disabled.contains("a")));
        }
        assert!(m.is_enabled("a"));
    }

    #[test]
    fn test_default_enabled_policy() {
        let mut m = Manifest::default();
        assert!(!m.is_enabled("ghost"));

        m.add_entry("a", entry("1.0.0", Scope::User));
        assert!(m.is_enabled("a"));

        m.set_enabled("a", false);
        assert!(!m.is_enabled("a"));

        m.set_enabled("a", true);
        assert!(m.is_enabled("a"));
    }

    #[test]
    fn test_add_entry_clears_stale_overrides() {
        let mut m = Manifest::default();
        m.add_entry("a", entry("1.0.0", Scope::User));
        m.set_enabled("a", false);
        // Reinstall resets to the default-enabled policy.
        m.add_entry("a", entry("1.1.0", Scope::User));
        assert!(m.is_enabled("a"));
        assert!(!m.disabled.contains("a"));
    }

    #[test]
    fn test_remove_entry_clears_overrides() {
        let mut m = Manifest::default();
        m.add_entry("a", entry("1.0.0", Scope::User));
        m.set_enabled("a", false);
        let removed = m.remove_entry("a").unwrap();
        assert_eq!(removed.version, "1.0.0");
        assert!(m.installed.is_empty());
        assert!(m.enabled.is_empty());
        assert!(m.disabled.is_empty());
    }

    #[test]
    fn test_external_change_detection() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("manifest.json");
        let mut store = ManifestStore::new(path.clone());

        let mut manifest = Manifest::default();
        store.save(&manifest).unwrap();
        store.load().unwrap();

        // Another process rewrites the file behind our back.
        std::fs::write(&path, "{}").unwrap();
        assert!(store.externally_changed());

        // Save still wins.
        manifest.add_entry("a", entry("1.0.0", Scope::User));
        store.save(&manifest).unwrap();
        let loaded = store.load().unwrap();
        assert!(loaded.contains("a"));
    }

    #[test]
    fn test_no_partial_write_visible() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("manifest.json");
        let mut store = ManifestStore::new(path.clone());
        let mut manifest = Manifest::default();
        manifest.add_entry("a", entry("1.0.0", Scope::User));
        store.save(&manifest).unwrap();

        // The temp file never survives a completed save.
        assert!(!path.with_extension("json.tmp").exists());
    }
}
