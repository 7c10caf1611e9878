//! # Settings
//!
//! Tiny persistent key-value store for operator preferences, most notably
//! the active printer address. Values are strings; the backing file is a
//! flat JSON object rewritten atomically on every set.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PrintError, PrintResult};

/// String key-value persistence. A trait so the service facade can be
/// exercised with an in-memory store in tests.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> PrintResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> PrintResult<()>;
    fn remove(&mut self, key: &str) -> PrintResult<()>;
}

/// JSON-file-backed store. The file is read on every get and rewritten
/// whole on every set; the entries are few and the simplicity wins.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user's config directory.
    pub fn default_path() -> PathBuf {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| Path::new(&h).join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("struk").join("settings.json")
    }

    fn load(&self) -> PrintResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| PrintError::Storage(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(PrintError::Storage(format!("{}: {e}", self.path.display()))),
        }
    }

    fn save(&self, map: &BTreeMap<String, String>) -> PrintResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| PrintError::Storage(format!("{}: {e}", dir.display())))?;
        }
        let text = serde_json::to_string_pretty(map)
            .map_err(|e| PrintError::Storage(e.to_string()))?;
        // Write-then-rename so a crash never leaves a torn file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| PrintError::Storage(format!("{}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> PrintResult<Option<String>> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> PrintResult<()> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        self.save(&map)
    }

    fn remove(&mut self, key: &str) -> PrintResult<()> {
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and one-shot invocations.
#[derive(Default)]
pub struct MemoryStore {
    map: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PrintResult<Option<String>> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> PrintResult<()> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> PrintResult<()> {
        self.map.remove(key);
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
