//! Bounded history of generated visualizations
//!
//! The store keeps the most recent entries (newest first) and writes the
//! whole list through a [`HistoryPersistence`] port after every change.
//! The port is injected so the same store runs against a JSON file, an
//! in-memory list in tests, or anything else that can load and save a list.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::defaults;
use crate::error::Result;
use crate::types::VisualizationResult;

/// A visualization remembered across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
    pub visualization: VisualizationResult,
}

impl HistoryEntry {
    /// Entry stamped with the current time.
    ///
    /// The id is taken from the visualization, or generated when it has none.
    pub fn new(visualization: VisualizationResult, prompt: impl Into<String>) -> Self {
        let id = visualization
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Self {
            id,
            prompt: prompt.into(),
            created_at: Utc::now(),
            visualization,
        }
    }
}

/// Storage port for the history list
pub trait HistoryPersistence {
    /// Read the stored list, newest first. Missing storage is an empty list.
    fn load(&self) -> Result<Vec<HistoryEntry>>;

    /// Replace the stored list
    fn save(&self, entries: &[HistoryEntry]) -> Result<()>;
}

impl<P: HistoryPersistence + ?Sized> HistoryPersistence for Arc<P> {
    fn load(&self) -> Result<Vec<HistoryEntry>> {
        (**self).load()
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        (**self).save(entries)
    }
}

/// Keeps the list in memory only
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<HistoryEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Snapshot of what was last saved
    pub fn saved(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl HistoryPersistence for MemoryPersistence {
    fn load(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.saved())
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        let mut guard = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = entries.to_vec();
        Ok(())
    }
}

/// Stores the list as a single JSON array file
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryPersistence for JsonFilePersistence {
    fn load(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(entries)?;

        // Write beside the target and rename so a crash never leaves half a file
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;

        log::debug!("History saved to {:?} ({} entries)", self.path, entries.len());
        Ok(())
    }
}

/// Most-recent-first list of visualizations, bounded to `limit` entries
pub struct HistoryStore<P: HistoryPersistence> {
    entries: Vec<HistoryEntry>,
    persistence: P,
    limit: usize,
}

impl<P: HistoryPersistence> HistoryStore<P> {
    /// Open the store with the default limit, loading what the port has.
    ///
    /// Unreadable storage is logged and treated as empty.
    pub fn open(persistence: P) -> Self {
        Self::with_limit(persistence, defaults::HISTORY_LIMIT)
    }

    pub fn with_limit(persistence: P, limit: usize) -> Self {
        let limit = limit.max(1);
        let mut entries = match persistence.load() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Failed to load history, starting empty: {}", e);
                Vec::new()
            }
        };
        entries.truncate(limit);

        Self {
            entries,
            persistence,
            limit,
        }
    }

    /// Entries, newest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Insert at the front, evicting the oldest entries beyond the limit.
    ///
    /// An entry with the same id is replaced and moves to the front.
    pub fn record(&mut self, entry: HistoryEntry) -> Result<()> {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.extend(
            self.entries
                .iter()
                .filter(|existing| existing.id != entry.id)
                .cloned(),
        );
        entries.insert(0, entry);

        if entries.len() > self.limit {
            let evicted = entries.len() - self.limit;
            entries.truncate(self.limit);
            log::debug!("Evicted {} old history entries", evicted);
        }

        self.commit(entries)
    }

    /// Remove by id, returning the removed entry
    pub fn remove(&mut self, id: &str) -> Result<Option<HistoryEntry>> {
        let Some(position) = self.entries.iter().position(|entry| entry.id == id) else {
            return Ok(None);
        };
        let mut entries = self.entries.clone();
        let removed = entries.remove(position);
        self.commit(entries)?;
        Ok(Some(removed))
    }

    pub fn clear(&mut self) -> Result<()> {
        self.commit(Vec::new())
    }

    /// The in-memory list only changes once the port has accepted it
    fn commit(&mut self, entries: Vec<HistoryEntry>) -> Result<()> {
        self.persistence.save(&entries)?;
        self.entries = entries;
        Ok(())
    }
}
