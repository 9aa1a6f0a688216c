//! Linear version history using compressed snapshots
//!
//! Every accepted visualization (generated, refined, edited or customized)
//! is pushed as a new snapshot. Undo and redo move a cursor over the
//! snapshots; a push after undo discards everything ahead of the cursor.
//!
//! Snapshots are stored as zstd-compressed JSON, the same representation
//! the history file uses.

use std::collections::VecDeque;

use crate::constants::defaults;
use crate::error::{Result, VizError};
use crate::types::VisualizationResult;

/// Undo/redo stack of visualization versions
pub struct VersionStack {
    /// Compressed visualization states (zstd)
    snapshots: VecDeque<Vec<u8>>,
    /// Cursor into `snapshots`; `None` while the stack is empty
    current: Option<usize>,
    /// Maximum number of snapshots to keep
    max_snapshots: usize,
}

impl VersionStack {
    /// Create a new stack keeping at most `max_snapshots` versions
    pub fn new(max_snapshots: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            current: None,
            max_snapshots: max_snapshots.max(1),
        }
    }

    /// Push a new version after the cursor.
    ///
    /// Any redo history (versions after the cursor) is discarded first.
    pub fn push(&mut self, result: &VisualizationResult) -> Result<()> {
        let compressed = compress(result)?;

        let keep = self.current.map_or(0, |idx| idx + 1);
        self.snapshots.truncate(keep);

        self.snapshots.push_back(compressed);

        // Trim old snapshots if over limit
        while self.snapshots.len() > self.max_snapshots {
            self.snapshots.pop_front();
        }

        self.current = Some(self.snapshots.len() - 1);
        Ok(())
    }

    /// Drop all versions and start over from `result`
    pub fn replace(&mut self, result: &VisualizationResult) -> Result<()> {
        let compressed = compress(result)?;
        self.snapshots.clear();
        self.snapshots.push_back(compressed);
        self.current = Some(0);
        Ok(())
    }

    /// Undo: move back one version
    ///
    /// Returns the previous version, or None if at the beginning.
    pub fn undo(&mut self) -> Option<Result<VisualizationResult>> {
        let target = self.current.filter(|&idx| idx > 0)? - 1;
        Some(self.move_to(target))
    }

    /// Redo: move forward one version
    ///
    /// Returns the next version, or None if at the end.
    pub fn redo(&mut self) -> Option<Result<VisualizationResult>> {
        let target = self.current.filter(|&idx| idx + 1 < self.snapshots.len())? + 1;
        Some(self.move_to(target))
    }

    /// Get the current version without moving the cursor
    pub fn current(&self) -> Option<Result<VisualizationResult>> {
        self.current.map(|idx| self.decompress(idx))
    }

    /// Cursor position, `None` when empty
    pub fn index(&self) -> Option<usize> {
        self.current
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.current.is_some_and(|idx| idx > 0)
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.current
            .is_some_and(|idx| idx + 1 < self.snapshots.len())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Clear all versions
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.current = None;
    }

    /// Get the total compressed size of all snapshots
    pub fn compressed_size(&self) -> usize {
        self.snapshots.iter().map(|s| s.len()).sum()
    }

    /// The cursor only moves once the snapshot has been decoded
    fn move_to(&mut self, index: usize) -> Result<VisualizationResult> {
        let result = self.decompress(index)?;
        self.current = Some(index);
        Ok(result)
    }

    fn decompress(&self, index: usize) -> Result<VisualizationResult> {
        let compressed = &self.snapshots[index];
        let json = zstd::decode_all(&compressed[..])
            .map_err(|e| VizError::Compression(e.to_string()))?;
        Ok(serde_json::from_slice(&json)?)
    }
}

impl Default for VersionStack {
    fn default() -> Self {
        Self::new(defaults::MAX_SNAPSHOTS)
    }
}

fn compress(result: &VisualizationResult) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(result)?;
    zstd::encode_all(&json[..], 3).map_err(|e| VizError::Compression(e.to_string()))
}
