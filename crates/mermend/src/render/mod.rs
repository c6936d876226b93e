//! Rendering: the engine boundary, the per-source state machine and the
//! debounced live driver

pub mod driver;
pub mod engine;
pub mod pipeline;

pub use driver::drive;
pub use engine::{initialize, settings, EngineSettings, RenderEngine, Theme};
pub use pipeline::{RenderJob, RenderOutcome, RenderPipeline, RenderResult, RenderState};
