//! HTTP client for the hosted generation API

use async_trait::async_trait;

use viz_engine::{GenerationError, GenerationRequest, Generator, VisualizationResult};

use crate::config::GenerationConfig;
use crate::constants::API_KEY_HEADER;
use crate::prompt::{build_user_prompt, SYSTEM_PROMPT};
use crate::response::decode_visualization;
use crate::types::{
    response_schema, Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse,
    GenerationParameters,
};

/// [`Generator`] backed by the `generateContent` endpoint
pub struct GenerationClient {
    /// HTTP client for API requests
    http_client: reqwest::Client,
    config: GenerationConfig,
}

impl GenerationClient {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            config,
        }
    }

    /// Client configured from `PROMPTVIZ_*` environment variables
    pub fn from_env() -> Self {
        Self::new(GenerationConfig::from_env())
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Request body for `request`
    pub fn build_body(&self, request: &GenerationRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content::text(None, SYSTEM_PROMPT),
            contents: vec![Content::text(Some("user"), build_user_prompt(request))],
            generation_config: GenerationParameters {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
                temperature: self.config.temperature,
            },
        }
    }
}

#[async_trait]
impl Generator for GenerationClient {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<VisualizationResult, GenerationError> {
        let api_key = self
            .config
            .credential()
            .ok_or(GenerationError::MissingCredential)?;

        let url = self.config.endpoint();
        log::debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("Generation API returned {}", status);
            return Err(error_for_status(status.as_u16(), &body));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            GenerationError::MalformedResponse(format!("Failed to parse response: {}", e))
        })?;

        let Some(text) = body.text() else {
            let reason = body
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            log::warn!("Generation returned no text ({})", reason);
            return Err(GenerationError::EmptyResponse);
        };

        let result = decode_visualization(&text)?;
        log::info!("Generated {} '{}'", result.kind(), result.title);
        Ok(result)
    }
}

fn network_error(e: reqwest::Error) -> GenerationError {
    GenerationError::Network(e.to_string())
}

/// Map a non-success HTTP status to an error kind
pub fn error_for_status(status: u16, body: &str) -> GenerationError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        400 => GenerationError::InvalidRequest(message),
        401 | 403 => GenerationError::PermissionDenied(message),
        404 => GenerationError::NotFound(message),
        429 => GenerationError::RateLimited,
        500..=599 => GenerationError::Server { status, message },
        _ => GenerationError::Api { status, message },
    }
}
