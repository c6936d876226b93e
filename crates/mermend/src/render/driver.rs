//! Debounced live render loop
//!
//! Source updates arrive on a channel while an editor is attached. Each
//! update restarts the debounce timer; once the source has been quiet for
//! the configured delay a render cycle starts. Engine calls run concurrently
//! with newer input, and the pipeline's generation check drops any result
//! that was overtaken.

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

use crate::core::DiagramSource;

use super::{RenderEngine, RenderPipeline};

/// Drive `pipeline` from a stream of source updates.
///
/// `on_commit` runs after every committed result, including immediate
/// empty-markup failures. Returns once the channel is closed, the last
/// pending update has been loaded and every in-flight engine call has
/// resolved. Runs on the caller's task; nothing is spawned.
pub async fn drive<E, F>(
    pipeline: &mut RenderPipeline,
    engine: &E,
    mut sources: mpsc::UnboundedReceiver<DiagramSource>,
    mut on_commit: F,
) where
    E: RenderEngine + ?Sized,
    F: FnMut(&RenderPipeline),
{
    let debounce = pipeline.config().debounce;
    debug!(debounce_ms = debounce.as_millis() as u64, "Live render driver started");

    let mut pending: Option<DiagramSource> = None;
    let mut deadline = Instant::now();
    let mut in_flight = FuturesUnordered::new();
    let mut sources_open = true;

    while sources_open || pending.is_some() || !in_flight.is_empty() {
        tokio::select! {
            update = sources.recv(), if sources_open => match update {
                Some(source) => {
                    trace!(source_len = source.len(), "Source updated, debouncing");
                    pending = Some(source);
                    deadline = Instant::now() + debounce;
                }
                None => {
                    debug!("Source channel closed");
                    sources_open = false;
                }
            },
            _ = sleep_until(deadline), if pending.is_some() => {
                if let Some(source) = pending.take() {
                    if pipeline.is_current(&source) {
                        trace!("Debounced source unchanged, skipping cycle");
                        continue;
                    }
                    match pipeline.load(source) {
                        Some(job) => in_flight.push(job.run(engine)),
                        None => on_commit(pipeline),
                    }
                }
            },
            Some(outcome) = in_flight.next(), if !in_flight.is_empty() => {
                if pipeline.commit(outcome) {
                    on_commit(pipeline);
                }
            },
        }
    }

    debug!(generation = pipeline.generation(), "Live render driver finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EngineError, PipelineConfig, RenderFailure};
    use crate::render::RenderResult;
    use futures::future::{BoxFuture, FutureExt};
    use std::cell::RefCell;
    use std::time::Duration;
    use tokio::time::sleep;

    /// Takes two seconds for markup mentioning "slow", ten milliseconds otherwise
    #[derive(Default)]
    struct TimedEngine {
        calls: RefCell<Vec<String>>,
    }

    impl RenderEngine for TimedEngine {
        fn render<'a>(
            &'a self,
            _element_id: &'a str,
            markup: &'a str,
        ) -> BoxFuture<'a, Result<String, EngineError>> {
            self.calls.borrow_mut().push(markup.to_string());
            async move {
                let delay = if markup.contains("slow") { 2000 } else { 10 };
                sleep(Duration::from_millis(delay)).await;
                Ok(format!("<svg><!-- {markup} --></svg>"))
            }
            .boxed()
        }
    }

    fn graphic_of(pipeline: &RenderPipeline) -> Option<String> {
        pipeline.result().and_then(RenderResult::graphic).map(str::to_string)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_updates_renders_once() {
        let engine = TimedEngine::default();
        let mut pipeline = RenderPipeline::new();
        let (tx, rx) = mpsc::unbounded_channel();
        for text in ["A --> B", "A --> C", "A --> D"] {
            tx.send(DiagramSource::new(text)).unwrap();
        }
        drop(tx);

        let mut commits = Vec::new();
        drive(&mut pipeline, &engine, rx, |p| commits.push(graphic_of(p))).await;

        assert_eq!(engine.calls.borrow().as_slice(), ["A --> D"]);
        assert_eq!(commits, vec![Some("<svg><!-- A --> D --></svg>".to_string())]);
        assert_eq!(pipeline.generation(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_restarts_debounce() {
        let engine = TimedEngine::default();
        let mut pipeline = RenderPipeline::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let typing = async move {
            tx.send(DiagramSource::new("A --> B")).unwrap();
            sleep(Duration::from_millis(200)).await;
            tx.send(DiagramSource::new("A --> C")).unwrap();
            sleep(Duration::from_millis(200)).await;
            tx.send(DiagramSource::new("A --> E")).unwrap();
        };

        let mut commits = 0;
        tokio::join!(drive(&mut pipeline, &engine, rx, |_| commits += 1), typing);

        assert_eq!(engine.calls.borrow().as_slice(), ["A --> E"]);
        assert_eq!(commits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_result_is_dropped() {
        let engine = TimedEngine::default();
        let mut pipeline = RenderPipeline::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let editing = async move {
            tx.send(DiagramSource::new("slow --> B")).unwrap();
            // First render is in flight by now
            sleep(Duration::from_millis(400)).await;
            tx.send(DiagramSource::new("fast --> C")).unwrap();
        };

        let mut commits = Vec::new();
        tokio::join!(
            drive(&mut pipeline, &engine, rx, |p| commits.push(graphic_of(p))),
            editing
        );

        assert_eq!(engine.calls.borrow().len(), 2);
        assert_eq!(commits, vec![Some("<svg><!-- fast --> C --></svg>".to_string())]);
        assert_eq!(graphic_of(&pipeline).as_deref(), Some("<svg><!-- fast --> C --></svg>"));
        assert_eq!(pipeline.generation(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_update_is_ignored() {
        let engine = TimedEngine::default();
        let mut pipeline = RenderPipeline::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let editing = async move {
            tx.send(DiagramSource::new("A --> B")).unwrap();
            sleep(Duration::from_millis(500)).await;
            tx.send(DiagramSource::new("A --> B")).unwrap();
        };

        let mut zooms = Vec::new();
        tokio::join!(
            drive(&mut pipeline, &engine, rx, |p| zooms.push(p.viewer().zoom())),
            editing
        );
        assert_eq!(engine.calls.borrow().len(), 1);
        assert_eq!(zooms.len(), 1);
        assert_eq!(pipeline.generation(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_update_keeps_zoom() {
        let engine = TimedEngine::default();
        let mut pipeline = RenderPipeline::new();
        pipeline.render(&engine, DiagramSource::new("A --> B")).await;
        pipeline.viewer_mut().zoom_in();
        let zoom = pipeline.viewer().zoom();

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(DiagramSource::new("A --> B")).unwrap();
        drop(tx);
        drive(&mut pipeline, &engine, rx, |_| {}).await;

        assert_eq!(engine.calls.borrow().len(), 1);
        assert_eq!(pipeline.viewer().zoom(), zoom);
        assert_eq!(pipeline.generation(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_source_commits_failure_immediately() {
        let engine = TimedEngine::default();
        let mut pipeline = RenderPipeline::with_config(
            PipelineConfig::new().with_debounce(Duration::from_millis(50)),
        );
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(DiagramSource::new("```\n\n```")).unwrap();
        drop(tx);

        let mut reasons = Vec::new();
        drive(&mut pipeline, &engine, rx, |p| {
            reasons.push(p.result().and_then(RenderResult::reason))
        })
        .await;

        assert!(engine.calls.borrow().is_empty());
        assert_eq!(reasons, vec![Some(RenderFailure::EmptyMarkup.to_string())]);
    }
}
