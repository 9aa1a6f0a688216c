//! Application-wide constants

/// Data storage paths
pub mod paths {
    /// Directory under the platform data dir holding config and history
    pub const APP_DIR: &str = "promptviz";
    /// Fallback when the platform has no data dir
    pub const FALLBACK_DIR: &str = ".promptviz";
}

/// Persisted file names
pub mod files {
    pub const CONFIG: &str = "config.json";
}

/// Interactive loop
pub mod repl {
    pub const PROMPT: &str = "promptviz> ";
    /// Timestamp format for history listings
    pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
}
