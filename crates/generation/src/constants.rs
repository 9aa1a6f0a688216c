//! Constants for the hosted generation API

/// Default values for the client configuration
pub mod defaults {
    /// Hosted API root
    pub const BASE_URL: &str = "https://generativelanguage.googleapis.com";
    /// Model used when none is configured
    pub const MODEL: &str = "gemini-2.5-flash";
    /// Sampling temperature; low so the JSON shape stays stable
    pub const TEMPERATURE: f32 = 0.2;
}

/// Environment variables read by [`GenerationConfig::from_env`](crate::GenerationConfig::from_env)
pub mod env {
    pub const API_KEY: &str = "PROMPTVIZ_API_KEY";
    /// Checked when `PROMPTVIZ_API_KEY` is unset
    pub const API_KEY_FALLBACK: &str = "GEMINI_API_KEY";
    pub const MODEL: &str = "PROMPTVIZ_MODEL";
    pub const BASE_URL: &str = "PROMPTVIZ_BASE_URL";
}

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Diagram families the renderer has no support for
pub const UNSUPPORTED_DIAGRAMS: &[&str] = &["zenuml", "architecture-beta"];
