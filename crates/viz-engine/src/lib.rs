//! Viz Engine - prompt-to-visualization core for promptviz
//!
//! This crate holds everything that does not talk to the network:
//!
//! - The visualization model (Mermaid diagrams, chart configs, raw SVG)
//! - Repair of model-written Mermaid before it reaches a renderer
//! - A session state machine with compressed undo/redo versions
//! - A bounded history of past generations behind a persistence port
//!
//! Generation itself is a port ([`Generator`]); the `generation` crate
//! provides the HTTP implementation.
//!
//! # Example
//!
//! ```ignore
//! use viz_engine::{HistoryStore, JsonFilePersistence, Session};
//!
//! let history = HistoryStore::open(JsonFilePersistence::new("history.json"));
//! let mut session = Session::new(client, history);
//!
//! session.generate("Flowchart of a user login process").await?;
//! session.refine("Add a 'forgot password' branch").await?;
//! session.undo()?;
//! ```

pub mod constants;
pub mod customize;
pub mod error;
pub mod export;
pub mod generator;
pub mod history;
pub mod normalize;
pub mod session;
pub mod types;
pub mod undo;
pub mod validation;

// Re-export key types
pub use customize::Customization;
pub use error::{GenerationError, Result, VizError};
pub use export::{export_source, ExportFile};
pub use generator::{GenerationRequest, Generator};
pub use history::{
    HistoryEntry, HistoryPersistence, HistoryStore, JsonFilePersistence, MemoryPersistence,
};
pub use normalize::{normalize_diagram, DiagramFamily};
pub use session::Session;
pub use types::{
    ChartConfig, ChartKind, SeriesSpec, VisualizationContent, VisualizationKind,
    VisualizationResult,
};
pub use undo::VersionStack;
pub use validation::parse_edited_source;
