//! Tiered language-preference storage
//!
//! Persists the user's language preference across an ordered list of
//! backends with automatic degradation: durable (platform config dir) →
//! session (per-process temp dir) → in-memory. Backend failures are caught,
//! logged, and cascaded to the next tier; nothing in this module propagates
//! a backend failure to the caller.

use crate::{I18nConfig, I18nError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

const PROBE_KEY: &str = "__storage_probe__";

/// A single preference storage backend.
///
/// Synchronous in practice, but every operation is fallible: external
/// storage is treated as shared, possibly unavailable state.
pub trait PreferenceBackend: Send + Sync {
    /// Stable backend name, used for probing and logging.
    fn name(&self) -> &'static str;

    /// Read the raw value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove any value stored under `key`.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Durable backend: one file per key under a directory.
///
/// Defaults to the platform config directory so the preference survives
/// restarts.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Store files under the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store files under the platform config directory.
    pub fn default_location() -> Self {
        let dir = directories::ProjectDirs::from("", "", "lattice-i18n")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("lattice-i18n"));
        Self::new(dir)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl PreferenceBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(I18nError::storage(self.name(), e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| I18nError::storage(self.name(), e))?;
        std::fs::write(self.path_for(key), value).map_err(|e| I18nError::storage(self.name(), e))
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(I18nError::storage(self.name(), e)),
        }
    }
}

/// Session-scoped backend: files under a per-process temp directory.
///
/// Outlives the manager but not the machine session; the middle tier
/// between the durable config dir and plain memory.
pub struct TempFileBackend {
    inner: FileBackend,
}

impl TempFileBackend {
    /// Create a backend scoped to the current process.
    pub fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("lattice-i18n-{}", std::process::id()));
        Self {
            inner: FileBackend::new(dir),
        }
    }
}

impl Default for TempFileBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceBackend for TempFileBackend {
    fn name(&self) -> &'static str {
        "session"
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.inner.write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }
}

/// In-memory backend, scoped to the manager instance. Never fails.
#[derive(Default)]
pub struct MemoryBackend {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.map.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.map.lock().remove(key);
        Ok(())
    }
}

/// Availability and content snapshot, for diagnostics.
#[derive(Debug, Clone)]
pub struct StorageInfo {
    /// Per-tier probe result, in tier order
    pub tiers: Vec<TierStatus>,
    /// The preference the manager would currently return
    pub stored_value: Option<String>,
    /// Whether the stored value passes validation (vacuously true if absent)
    pub is_valid: bool,
}

/// Probe result for one tier.
#[derive(Debug, Clone)]
pub struct TierStatus {
    pub name: &'static str,
    pub available: bool,
}

/// Tiered preference manager.
///
/// Methods never throw out of their own signature for backend failures;
/// failures degrade to the next tier. Only total exhaustion is silently
/// absorbed (the preference simply is not persisted).
pub struct StorageManager {
    config: Arc<I18nConfig>,
    tiers: Vec<Box<dyn PreferenceBackend>>,
}

impl StorageManager {
    /// Create a manager with the default tier chain: file → session → memory.
    pub fn new(config: Arc<I18nConfig>) -> Self {
        Self::with_tiers(
            config,
            vec![
                Box::new(FileBackend::default_location()),
                Box::new(TempFileBackend::new()),
                Box::new(MemoryBackend::new()),
            ],
        )
    }

    /// Create a manager over explicit tiers, ordered most to least durable.
    pub fn with_tiers(config: Arc<I18nConfig>, tiers: Vec<Box<dyn PreferenceBackend>>) -> Self {
        Self { config, tiers }
    }

    /// Sanitize a raw stored value: trim, lowercase, validate supported.
    ///
    /// Invalid values are treated as absent, not returned.
    fn sanitize(&self, raw: &str) -> Option<String> {
        let sanitized = raw.trim().to_lowercase();
        if self.config.is_supported(&sanitized) {
            Some(sanitized)
        } else {
            tracing::warn!(value = raw, "invalid language code found in storage");
            None
        }
    }

    /// Persist a language preference.
    ///
    /// Unsupported codes are rejected (logged, no-op). Otherwise the first
    /// tier that accepts the write wins.
    pub fn save_language_preference(&self, code: &str) {
        if !self.config.is_supported(code) {
            tracing::error!(
                code,
                supported = ?self.config.supported_codes(),
                "refusing to persist unsupported language code"
            );
            return;
        }

        for tier in &self.tiers {
            match tier.write(&self.config.storage_key, code) {
                Ok(()) => {
                    tracing::debug!(code, backend = tier.name(), "language preference saved");
                    return;
                }
                Err(e) => {
                    tracing::warn!(backend = tier.name(), error = %e, "preference write failed, trying next tier");
                }
            }
        }

        tracing::warn!(code, "all storage tiers failed, preference not persisted");
    }

    /// Read the first valid stored preference across the tiers.
    pub fn get_language_preference(&self) -> Option<String> {
        for tier in &self.tiers {
            match tier.read(&self.config.storage_key) {
                Ok(Some(raw)) => {
                    if let Some(code) = self.sanitize(&raw) {
                        return Some(code);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(backend = tier.name(), error = %e, "preference read failed");
                }
            }
        }
        None
    }

    /// Clear the preference from every tier, swallowing individual failures.
    pub fn clear_language_preference(&self) {
        for tier in &self.tiers {
            if let Err(e) = tier.remove(&self.config.storage_key) {
                tracing::warn!(backend = tier.name(), error = %e, "failed to clear preference");
            }
        }
    }

    /// Self-healing startup pass: remove any stored value that fails
    /// validation from whichever tier holds it.
    pub fn validate_and_clean_storage(&self) {
        for tier in &self.tiers {
            match tier.read(&self.config.storage_key) {
                Ok(Some(raw)) => {
                    let sanitized = raw.trim().to_lowercase();
                    if !self.config.is_supported(&sanitized) {
                        tracing::warn!(
                            backend = tier.name(),
                            value = raw,
                            "removing invalid language preference"
                        );
                        if let Err(e) = tier.remove(&self.config.storage_key) {
                            tracing::warn!(backend = tier.name(), error = %e, "cleanup failed");
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(backend = tier.name(), error = %e, "validation read failed");
                }
            }
        }
    }

    /// Probe a backend by name with a sentinel write/remove.
    pub fn is_storage_available(&self, name: &str) -> bool {
        let Some(tier) = self.tiers.iter().find(|t| t.name() == name) else {
            return false;
        };
        Self::probe(tier.as_ref())
    }

    fn probe(tier: &dyn PreferenceBackend) -> bool {
        tier.write(PROBE_KEY, "probe").is_ok() && tier.remove(PROBE_KEY).is_ok()
    }

    /// Snapshot of tier availability and the currently stored value.
    pub fn storage_info(&self) -> StorageInfo {
        let tiers = self
            .tiers
            .iter()
            .map(|t| TierStatus {
                name: t.name(),
                available: Self::probe(t.as_ref()),
            })
            .collect();
        let stored_value = self.get_language_preference();
        let is_valid = stored_value
            .as_deref()
            .map(|v| self.config.is_supported(v))
            .unwrap_or(true);

        StorageInfo {
            tiers,
            stored_value,
            is_valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend that fails every operation, for cascade tests.
    struct BrokenBackend;

    impl PreferenceBackend for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn read(&self, _key: &str) -> Result<Option<String>> {
            Err(I18nError::storage("broken", "backend down"))
        }

        fn write(&self, _key: &str, _value: &str) -> Result<()> {
            Err(I18nError::storage("broken", "backend down"))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(I18nError::storage("broken", "backend down"))
        }
    }

    fn memory_manager() -> StorageManager {
        StorageManager::with_tiers(
            Arc::new(I18nConfig::default()),
            vec![Box::new(MemoryBackend::new())],
        )
    }

    #[test]
    fn test_save_and_get_round_trip() {
        let manager = memory_manager();

        manager.save_language_preference("en");
        assert_eq!(manager.get_language_preference(), Some("en".to_string()));
    }

    #[test]
    fn test_unsupported_save_is_a_no_op() {
        let manager = memory_manager();

        manager.save_language_preference("en");
        manager.save_language_preference("xx");
        assert_eq!(manager.get_language_preference(), Some("en".to_string()));
    }

    #[test]
    fn test_get_sanitizes_stored_value() {
        let manager = memory_manager();

        manager.tiers[0]
            .write(&manager.config.storage_key, "  EN \n")
            .unwrap();
        assert_eq!(manager.get_language_preference(), Some("en".to_string()));
    }

    #[test]
    fn test_invalid_stored_value_treated_as_absent() {
        let manager = memory_manager();

        manager.tiers[0]
            .write(&manager.config.storage_key, "klingon")
            .unwrap();
        assert_eq!(manager.get_language_preference(), None);
    }

    #[test]
    fn test_save_cascades_past_broken_tier() {
        let manager = StorageManager::with_tiers(
            Arc::new(I18nConfig::default()),
            vec![Box::new(BrokenBackend), Box::new(MemoryBackend::new())],
        );

        manager.save_language_preference("ja");
        assert_eq!(manager.get_language_preference(), Some("ja".to_string()));
    }

    #[test]
    fn test_clear_removes_from_all_tiers() {
        let manager = StorageManager::with_tiers(
            Arc::new(I18nConfig::default()),
            vec![Box::new(MemoryBackend::new()), Box::new(MemoryBackend::new())],
        );

        for tier in &manager.tiers {
            tier.write(&manager.config.storage_key, "en").unwrap();
        }
        manager.clear_language_preference();
        assert_eq!(manager.get_language_preference(), None);
    }

    #[test]
    fn test_validate_and_clean_removes_corrupt_values() {
        let manager = memory_manager();

        manager.tiers[0]
            .write(&manager.config.storage_key, "garbage!!")
            .unwrap();
        manager.validate_and_clean_storage();
        assert_eq!(
            manager.tiers[0].read(&manager.config.storage_key).unwrap(),
            None
        );
    }

    #[test]
    fn test_validate_and_clean_keeps_valid_values() {
        let manager = memory_manager();

        manager.tiers[0]
            .write(&manager.config.storage_key, "en")
            .unwrap();
        manager.validate_and_clean_storage();
        assert_eq!(manager.get_language_preference(), Some("en".to_string()));
    }

    #[test]
    fn test_is_storage_available() {
        let manager = StorageManager::with_tiers(
            Arc::new(I18nConfig::default()),
            vec![Box::new(BrokenBackend), Box::new(MemoryBackend::new())],
        );

        assert!(!manager.is_storage_available("broken"));
        assert!(manager.is_storage_available("memory"));
        assert!(!manager.is_storage_available("nonexistent"));
    }

    #[test]
    fn test_file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        backend.write("preferred-language", "ja").unwrap();
        assert_eq!(
            backend.read("preferred-language").unwrap(),
            Some("ja".to_string())
        );
        backend.remove("preferred-language").unwrap();
        assert_eq!(backend.read("preferred-language").unwrap(), None);
        // Removing again is not an error
        backend.remove("preferred-language").unwrap();
    }

    #[test]
    fn test_storage_info() {
        let manager = memory_manager();
        manager.save_language_preference("zh");

        let info = manager.storage_info();
        assert_eq!(info.tiers.len(), 1);
        assert!(info.tiers[0].available);
        assert_eq!(info.stored_value, Some("zh".to_string()));
        assert!(info.is_valid);
    }
}
