//! Generation-tracked render state machine
//!
//! Every load or explicit re-render starts a new cycle with a higher
//! generation number. The engine call for a cycle runs outside the pipeline
//! as a [`RenderJob`]; its [`RenderOutcome`] is only committed while its
//! generation is still the current one, so results for superseded sources
//! are dropped instead of overwriting newer state.

use tracing::{debug, info, span, warn, Level};
use uuid::Uuid;

use crate::core::{DiagramError, DiagramSource, PipelineConfig, RenderFailure};
use crate::export::{self, ExportArtifact};
use crate::normalizer::{Normalizer, RepairReport};
use crate::viewer::ViewerState;

use super::RenderEngine;

/// Prefix of every element identifier handed to the engine
pub const ELEMENT_ID_PREFIX: &str = "mermend";

/// Outcome of one render cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResult {
    Rendered { graphic: String, element_id: String },
    Failed(RenderFailure),
}

impl RenderResult {
    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderResult::Rendered { .. })
    }

    /// The SVG document, if the cycle succeeded
    pub fn graphic(&self) -> Option<&str> {
        match self {
            RenderResult::Rendered { graphic, .. } => Some(graphic),
            RenderResult::Failed(_) => None,
        }
    }

    /// Human readable failure reason, if the cycle failed
    pub fn reason(&self) -> Option<String> {
        match self {
            RenderResult::Rendered { .. } => None,
            RenderResult::Failed(failure) => Some(failure.to_string()),
        }
    }
}

/// Where the pipeline currently stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RenderState {
    #[default]
    Idle,
    Rendering { generation: u64 },
    Done(RenderResult),
}

/// One engine invocation, detached from the pipeline while it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    pub generation: u64,
    pub element_id: String,
    pub markup: String,
}

impl RenderJob {
    /// Call the engine; an engine error becomes a failed result.
    pub async fn run<E: RenderEngine + ?Sized>(self, engine: &E) -> RenderOutcome {
        debug!(
            generation = self.generation,
            element_id = %self.element_id,
            markup_len = self.markup.len(),
            "Invoking render engine"
        );

        let result = match engine.render(&self.element_id, &self.markup).await {
            Ok(graphic) => RenderResult::Rendered {
                graphic,
                element_id: self.element_id,
            },
            Err(error) => {
                debug!(generation = self.generation, error = %error, "Engine rejected markup");
                RenderResult::Failed(error.into())
            }
        };

        RenderOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// A finished job, waiting to be committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub generation: u64,
    pub result: RenderResult,
}

/// Owns the current source, its render result and the viewer state
#[derive(Debug, Default)]
pub struct RenderPipeline {
    config: PipelineConfig,
    normalizer: Normalizer,
    source: Option<DiagramSource>,
    generation: u64,
    state: RenderState,
    report: RepairReport,
    viewer: ViewerState,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            normalizer: Normalizer::with_config(config.normalizer.clone()),
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Replace the source and start a new cycle.
    ///
    /// Returns the job to run, or `None` when normalization left nothing to
    /// render, in which case the cycle has already failed. Loading the text
    /// that is already current is a no-op: no cycle starts and the viewer
    /// keeps its zoom. Use [`rerender`](Self::rerender) to render it again.
    pub fn load(&mut self, source: DiagramSource) -> Option<RenderJob> {
        if self.is_current(&source) {
            debug!(generation = self.generation, "Source unchanged, keeping current cycle");
            return None;
        }

        info!(source_len = source.len(), "Loading diagram source");
        self.source = Some(source);
        self.viewer.reset();
        self.start_cycle()
    }

    /// Start a new cycle for the current source, at the user's request.
    pub fn rerender(&mut self) -> Option<RenderJob> {
        if self.source.is_none() {
            debug!("Re-render requested without a source");
            return None;
        }
        self.start_cycle()
    }

    /// True when `source` has the same text as the loaded source
    pub fn is_current(&self, source: &DiagramSource) -> bool {
        self.source.as_ref() == Some(source)
    }

    fn start_cycle(&mut self) -> Option<RenderJob> {
        let source = self.source.as_ref()?;

        self.generation += 1;
        let generation = self.generation;
        let cycle_span = span!(Level::INFO, "render_cycle", generation);
        let _enter = cycle_span.enter();

        let normalized = self.normalizer.normalize_source(source);
        self.report = normalized.report;

        if normalized.is_empty() {
            warn!("Nothing left to render after normalization");
            self.state = RenderState::Done(RenderResult::Failed(RenderFailure::EmptyMarkup));
            return None;
        }

        let element_id = format!("{}-{}-{}", ELEMENT_ID_PREFIX, generation, Uuid::new_v4().simple());
        debug!(element_id = %element_id, "Render cycle started");
        self.state = RenderState::Rendering { generation };

        Some(RenderJob {
            generation,
            element_id,
            markup: normalized.markup,
        })
    }

    /// Apply a finished job.
    ///
    /// Returns `false`, leaving the state untouched, when the outcome belongs
    /// to a superseded generation.
    pub fn commit(&mut self, outcome: RenderOutcome) -> bool {
        if outcome.generation != self.generation {
            warn!(
                outcome_generation = outcome.generation,
                current_generation = self.generation,
                "Dropping late render result"
            );
            return false;
        }

        match &outcome.result {
            RenderResult::Rendered { element_id, .. } => {
                info!(generation = outcome.generation, element_id = %element_id, "Render committed");
            }
            RenderResult::Failed(failure) => {
                info!(generation = outcome.generation, reason = %failure, "Render failed");
            }
        }
        self.state = RenderState::Done(outcome.result);
        true
    }

    /// Load `source` and run its cycle to completion.
    pub async fn render<E: RenderEngine + ?Sized>(
        &mut self,
        engine: &E,
        source: DiagramSource,
    ) -> Option<&RenderResult> {
        if let Some(job) = self.load(source) {
            let outcome = job.run(engine).await;
            self.commit(outcome);
        }
        self.result()
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// The committed result; `None` while idle or rendering
    pub fn result(&self) -> Option<&RenderResult> {
        match &self.state {
            RenderState::Done(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_rendering(&self) -> bool {
        matches!(self.state, RenderState::Rendering { .. })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> Option<&DiagramSource> {
        self.source.as_ref()
    }

    /// Raw source text for the clipboard
    pub fn copy_code(&self) -> Option<&str> {
        self.source.as_ref().map(DiagramSource::copy_code)
    }

    /// Repair statistics of the latest cycle
    pub fn report(&self) -> RepairReport {
        self.report
    }

    pub fn viewer(&self) -> &ViewerState {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut ViewerState {
        &mut self.viewer
    }

    pub fn export_svg(&self, title: &str) -> Result<ExportArtifact, DiagramError> {
        export::export_svg(self.result(), title)
    }

    pub fn export_png(&self, title: &str) -> Result<ExportArtifact, DiagramError> {
        export::export_png(self.result(), title)
    }
}
