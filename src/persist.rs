use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::warn;

/// Per-level desired selections and filter strings, remembered across
/// runs so the console reopens where it was left.
pub const KEY_APP: &str = "app";
pub const KEY_VERSION: &str = "version";
pub const KEY_TEST: &str = "test";
pub const KEY_OPEN_BOARD: &str = "open_board";
pub const KEY_CLOSED_BOARD: &str = "closed_board";
pub const KEY_OPEN_FILTER: &str = "open_board_filter";
pub const KEY_CLOSED_FILTER: &str = "closed_board_filter";

/// Key-value store backed by a JSON file under the user config
/// directory. Feature-detected: when the directory or file cannot be
/// used the store runs disabled, reads return nothing and writes are
/// dropped, and the rest of the program behaves as on a first run.
pub struct StateStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl StateStore {
    /// Opens the store at `$XDG_CONFIG_HOME/madm/state.json`, falling
    /// back to `~/.config/madm/state.json`.
    pub fn open() -> Self {
        match Self::default_path() {
            Some(path) => Self::at(path),
            None => {
                warn!("no config directory available, selections will not persist");
                Self::disabled()
            }
        }
    }

    pub fn at(path: PathBuf) -> Self {
        if let Some(dir) = path.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!(dir = %dir.display(), "cannot create state directory: {}", e);
                return Self::disabled();
            }
        }
        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), "ignoring unreadable state file: {}", e);
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self {
            path: Some(path),
            entries,
        }
    }

    pub fn disabled() -> Self {
        Self {
            path: None,
            entries: BTreeMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    fn default_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("madm").join("state.json"))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Writes through on every change; a failed write degrades to a
    /// warning, never an error for the caller.
    pub fn set(&mut self, key: &str, value: &str) {
        if self.path.is_none() {
            return;
        }
        if self.entries.get(key).map(String::as_str) == Some(value) {
            return;
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.save();
    }

    pub fn remove(&mut self, key: &str) {
        if self.path.is_none() {
            return;
        }
        if self.entries.remove(key).is_some() {
            self.save();
        }
    }

    fn save(&self) {
        let Some(path) = &self.path else { return };
        match serde_json::to_string_pretty(&self.entries) {
            Ok(text) => {
                if let Err(e) = fs::write(path, text) {
                    warn!(path = %path.display(), "cannot write state file: {}", e);
                }
            }
            Err(e) => warn!("cannot serialize state: {}", e),
        }
    }
}
