//! Mermend - Repair, render and export Mermaid diagram markup
//!
//! Diagram markup produced by language models or typed by hand is often
//! almost right: unicode arrows, chained edges, labels full of punctuation.
//! This library repairs such markup with a fixed set of pattern-based passes,
//! hands the result to an external layout engine, and exports what comes
//! back as SVG or PNG.
//!
//! # Quick Start
//!
//! ```rust
//! use mermend::normalize;
//!
//! let markup = normalize("graph TD\nA → B → C");
//! assert_eq!(markup, "graph TD\n    A --> B\n    B --> C");
//! ```
//!
//! # Advanced Usage
//!
//! ```rust
//! use mermend::prelude::*;
//!
//! let config = NormalizerConfig::new().with_max_label_chars(40);
//! let normalizer = Normalizer::with_config(config);
//!
//! let normalized = normalizer.normalize("A[Deploy: prod (eu)] --> B --> C");
//! assert_eq!(normalized.report.split_lines, 1);
//! assert!(normalized.markup.starts_with("A[Deploy - prod] --> B"));
//! ```

pub mod core;
pub mod export;
pub mod normalizer;
pub mod passes;
pub mod render;
pub mod viewer;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        DiagramError, DiagramSource, EdgeOperator, EngineError, LabelKind, NormalizerConfig,
        PipelineConfig, RenderFailure,
    };
    pub use crate::export::{export_png, export_svg, ExportArtifact, ExportFormat};
    pub use crate::normalizer::{Normalized, Normalizer, RepairReport};
    pub use crate::render::{
        EngineSettings, RenderEngine, RenderJob, RenderOutcome, RenderPipeline, RenderResult,
        RenderState, Theme,
    };
    pub use crate::viewer::ViewerState;
}

/// Normalize diagram markup with the default settings
///
/// # Example
/// ```rust
/// use mermend::normalize;
///
/// assert_eq!(normalize("A ⇒ B"), "A --> B");
/// assert_eq!(normalize("```mermaid\n\n```"), "");
/// ```
pub fn normalize(input: &str) -> String {
    normalizer::Normalizer::new().normalize(input).markup
}
