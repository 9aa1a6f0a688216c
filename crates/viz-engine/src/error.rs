//! Error types for the visualization engine

use thiserror::Error;

/// Result type alias using VizError
pub type Result<T> = std::result::Result<T, VizError>;

/// Failures reported by a [`Generator`](crate::Generator) implementation.
///
/// Transport and API tiers are collapsed into these kinds so the session can
/// surface a message without knowing which backend produced the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// No API credential configured
    #[error("API key is not configured")]
    MissingCredential,

    /// Transport failed before a response arrived
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Model or endpoint not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    InvalidRequest(String),

    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The model produced a diagram family the renderer cannot draw
    #[error("Unsupported diagram type: {0}")]
    UnsupportedDiagram(String),
}

impl GenerationError {
    /// Message shown to the user for this failure
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential => {
                "No API key configured. Set PROMPTVIZ_API_KEY and try again.".to_string()
            }
            Self::Network(_) => {
                "Could not reach the generation service. Check your connection.".to_string()
            }
            Self::RateLimited => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            Self::PermissionDenied(_) => {
                "The API key was rejected. Check that it is valid and has access to the model."
                    .to_string()
            }
            Self::NotFound(_) => "The configured model could not be found.".to_string(),
            Self::Server { .. } => {
                "The generation service is having trouble. Try again later.".to_string()
            }
            Self::EmptyResponse | Self::MalformedResponse(_) => {
                "The model returned a response that could not be understood. Try rephrasing your prompt."
                    .to_string()
            }
            Self::UnsupportedDiagram(family) => format!(
                "The model produced a '{}' diagram, which cannot be rendered. Try asking for a different diagram type.",
                family
            ),
            Self::InvalidRequest(_) | Self::Api { .. } => {
                "Something went wrong while generating the visualization.".to_string()
            }
        }
    }
}

/// Errors surfaced by session, history and validation operations
#[derive(Debug, Error)]
pub enum VizError {
    /// The generation call failed
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Manually edited content failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation needs a displayed visualization
    #[error("No visualization is active")]
    NoActiveVisualization,

    #[error("History entry not found: {0}")]
    HistoryEntryNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Compression error
    #[error("Compression error: {0}")]
    Compression(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VizError {
    /// Create a validation error with a message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Message shown to the user for this failure
    pub fn user_message(&self) -> String {
        match self {
            Self::Generation(err) => err.user_message(),
            Self::Validation(msg) => msg.clone(),
            Self::NoActiveVisualization => {
                "Generate a visualization first.".to_string()
            }
            Self::HistoryEntryNotFound(_) => "That history entry no longer exists.".to_string(),
            _ => "An unexpected error occurred.".to_string(),
        }
    }
}
