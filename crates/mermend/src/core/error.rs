//! Core error types for markup repair, rendering and export
//!
//! Every error in this crate is recoverable: a failed diagram is reported
//! to the user alongside its original source and never blocks anything else.

use thiserror::Error;

/// Error raised by a rendering engine for markup it cannot lay out
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Why a render cycle ended in the failed state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderFailure {
    /// Normalization left nothing to render; the engine is never called
    #[error("empty markup")]
    EmptyMarkup,

    /// The engine threw on the normalized markup
    #[error("{message}")]
    EngineRejected { message: String },
}

impl From<EngineError> for RenderFailure {
    fn from(error: EngineError) -> Self {
        Self::EngineRejected {
            message: error.message,
        }
    }
}

/// Errors returned by fallible crate operations
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error(transparent)]
    Render(#[from] RenderFailure),

    #[error("nothing to export")]
    NothingToExport,

    #[error("SVG parse error: {message}")]
    SvgParse { message: String },

    #[error("Raster error: {message}")]
    Raster { message: String },

    #[error("Rendering engine is already initialized")]
    EngineAlreadyInitialized,

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl DiagramError {
    /// Create a new SVG parse error
    pub fn svg_parse(message: impl Into<String>) -> Self {
        Self::SvgParse {
            message: message.into(),
        }
    }

    /// Create a new raster error
    pub fn raster(message: impl Into<String>) -> Self {
        Self::Raster {
            message: message.into(),
        }
    }
}
