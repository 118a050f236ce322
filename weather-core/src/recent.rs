use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::{collections::HashMap, fmt::Debug, fs, path::PathBuf};

pub const RECENT_SEARCHES_KEY: &str = "recent_searches";
pub const MAX_RECENT_SEARCHES: usize = 5;

/// A named-slot string store, the persistence seam for recent searches.
pub trait KeyValueStore: Send + Debug {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Keeps each slot as `<key>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform data directory.
    pub fn in_data_dir() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(Self::new(dirs.data_dir()))
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(contents))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory: {}", self.dir.display()))?;

        let path = self.slot_path(key);
        fs::write(&path, value).with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Up to five distinct place names, most recent first, persisted as a JSON array.
#[derive(Debug)]
pub struct RecentSearchesStore {
    backend: Box<dyn KeyValueStore>,
    entries: Vec<String>,
}

impl RecentSearchesStore {
    /// Open the store and read whatever was persisted. Missing or malformed data
    /// yields an empty list.
    pub fn load(backend: Box<dyn KeyValueStore>) -> Self {
        let entries = match backend.get(RECENT_SEARCHES_KEY) {
            Ok(Some(raw)) => parse_entries(&raw),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "Could not read recent searches");
                Vec::new()
            }
        };

        Self { backend, entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Put `name` at the front, drop any case-insensitive duplicate, keep five,
    /// and persist. A storage failure is logged; the in-memory list still updates.
    pub fn record(&mut self, name: &str) -> Vec<String> {
        let name = name.trim();
        if name.is_empty() {
            return self.entries.clone();
        }

        self.entries.retain(|existing| !same_place(existing, name));
        self.entries.insert(0, name.to_string());
        self.entries.truncate(MAX_RECENT_SEARCHES);

        if let Err(err) = self.persist() {
            tracing::warn!(error = %err, "Could not persist recent searches");
        }

        self.entries.clone()
    }

    fn persist(&mut self) -> Result<()> {
        let json =
            serde_json::to_string(&self.entries).context("Failed to encode recent searches")?;
        self.backend.set(RECENT_SEARCHES_KEY, &json)
    }
}

fn same_place(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Decode the stored array, tolerating junk: non-strings and blanks are skipped,
/// duplicates dropped, and the list cut to five.
fn parse_entries(raw: &str) -> Vec<String> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(err) => {
            tracing::warn!(error = %err, "Ignoring malformed recent searches");
            return Vec::new();
        }
    };

    let mut entries: Vec<String> = Vec::new();
    for name in values.iter().filter_map(|v| v.as_str()).map(str::trim) {
        if name.is_empty() || entries.iter().any(|e| same_place(e, name)) {
            continue;
        }
        entries.push(name.to_string());
        if entries.len() == MAX_RECENT_SEARCHES {
            break;
        }
    }

    entries
}
