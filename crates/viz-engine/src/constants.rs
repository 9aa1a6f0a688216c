//! Engine-wide constants
//!
//! Single source of truth for limits and file names shared by the session,
//! the history store and the front end.

/// Default values for engine configuration
pub mod defaults {
    /// Number of history entries kept (newest first)
    pub const HISTORY_LIMIT: usize = 5;
    /// Versions kept by the undo/redo stack before the oldest is dropped
    pub const MAX_SNAPSHOTS: usize = 100;
    /// Title used when the model leaves it blank
    pub const UNTITLED: &str = "Untitled visualization";
}

/// Persisted file names
pub mod files {
    /// Serialized history list
    pub const HISTORY: &str = "history.json";
}
