//! Generation client for promptviz
//!
//! Implements the [`viz_engine::Generator`] port on top of a hosted
//! `generateContent` API. The model is asked for a strict JSON answer which
//! is decoded into a [`viz_engine::VisualizationResult`]; diagram source is
//! run through the engine's normalizer before it is returned.
//!
//! # Example
//!
//! ```rust,ignore
//! use generation::{GenerationClient, GenerationConfig};
//! use viz_engine::{GenerationRequest, Generator};
//!
//! let client = GenerationClient::new(GenerationConfig::from_env());
//! let result = client
//!     .generate(&GenerationRequest::new("Bar chart of Q1 sales"))
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod prompt;
pub mod response;
pub mod types;

// Re-exports for convenience
pub use client::{error_for_status, GenerationClient};
pub use config::GenerationConfig;
pub use response::decode_visualization;
