//! Port to whatever turns prompts into visualizations

use async_trait::async_trait;

use crate::error::{GenerationError, Result};
use crate::types::VisualizationResult;

/// A single generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Serialized visualization being refined, if any
    pub context: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context: None,
        }
    }

    /// Request that carries `current` as JSON so the model can revise it
    pub fn refinement(prompt: impl Into<String>, current: &VisualizationResult) -> Result<Self> {
        Ok(Self {
            prompt: prompt.into(),
            context: Some(serde_json::to_string_pretty(current)?),
        })
    }
}

/// Produces a visualization from a prompt.
///
/// Implementations perform at most one outstanding call per session; the
/// session never retries.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<VisualizationResult, GenerationError>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for std::sync::Arc<G> {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<VisualizationResult, GenerationError> {
        (**self).generate(request).await
    }
}
