//! End-to-end repair, render and export scenarios

use futures::future::{BoxFuture, FutureExt};
use mermend::prelude::*;
use mermend::normalize;

/// Accepts flowcharts, rejects anything mentioning "broken"
struct StubEngine;

impl RenderEngine for StubEngine {
    fn render<'a>(
        &'a self,
        element_id: &'a str,
        markup: &'a str,
    ) -> BoxFuture<'a, Result<String, EngineError>> {
        async move {
            if markup.contains("broken") {
                Err(EngineError::new("Syntax error in text"))
            } else {
                Ok(format!(
                    r#"<svg xmlns="http://www.w3.org/2000/svg" id="{element_id}" width="40" height="20"><rect width="40" height="20" fill="navy"/></svg>"#
                ))
            }
        }
        .boxed()
    }
}

fn trimmed_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).collect()
}

#[test]
fn test_unicode_chain_becomes_two_statements() {
    let markup = normalize("A → B → C");
    assert_eq!(trimmed_lines(&markup), vec!["A --> B", "B --> C"]);
}

#[test]
fn test_label_with_parens_and_colon_default_bound() {
    let markup = normalize("[Authenticate User (OAuth2): validate token]");
    assert_eq!(markup, "[Authenticate User - validat...]");
    assert!(markup.chars().count() - 2 <= 30);
}

#[test]
fn test_label_with_parens_and_colon_wider_bound() {
    let normalizer = Normalizer::with_config(NormalizerConfig::new().with_max_label_chars(40));
    let normalized = normalizer.normalize("[Authenticate User (OAuth2): validate token]");
    assert_eq!(normalized.markup, "[Authenticate User - validate token]");
}

#[tokio::test]
async fn test_fenced_whitespace_fails_without_engine() {
    let input = "  ```mermaid\n   \n\t\n```  ";
    assert_eq!(normalize(input), "");

    let mut pipeline = RenderPipeline::new();
    assert!(pipeline.load(DiagramSource::new(input)).is_none());
    assert_eq!(
        pipeline.result(),
        Some(&RenderResult::Failed(RenderFailure::EmptyMarkup))
    );
}

#[tokio::test]
async fn test_success_after_failure_shows_no_stale_error() {
    let mut pipeline = RenderPipeline::new();

    let failed = pipeline
        .render(&StubEngine, DiagramSource::new("graph TD\nbroken --> B"))
        .await
        .cloned();
    assert_eq!(
        failed.and_then(|r| r.reason()).as_deref(),
        Some("Syntax error in text")
    );

    let result = pipeline
        .render(&StubEngine, DiagramSource::new("graph TD\nA --> B"))
        .await
        .cloned()
        .unwrap();
    assert!(result.is_rendered());
    assert!(result.reason().is_none());
    assert!(!result.graphic().unwrap_or_default().contains("Syntax error"));
}

#[tokio::test]
async fn test_export_after_failure_produces_nothing() {
    let mut pipeline = RenderPipeline::new();
    pipeline
        .render(&StubEngine, DiagramSource::new("broken --> B"))
        .await;

    let svg = pipeline.export_svg("Broken");
    let png = pipeline.export_png("Broken");
    for export in [svg, png] {
        let error = export.unwrap_err();
        assert!(matches!(error, DiagramError::NothingToExport));
        assert_eq!(error.to_string(), "nothing to export");
    }
}

#[tokio::test]
async fn test_render_then_export_both_formats() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = RenderPipeline::new();
    pipeline
        .render(&StubEngine, DiagramSource::new("graph LR\nA → B"))
        .await;

    let svg = pipeline.export_svg("Login Flow").unwrap();
    let png = pipeline.export_png("Login Flow").unwrap();
    let svg_path = svg.write_to(dir.path()).unwrap();
    let png_path = png.write_to(dir.path()).unwrap();

    assert!(svg_path.ends_with("Login_Flow.svg"));
    assert!(png_path.ends_with("Login_Flow.png"));
    assert!(std::fs::read_to_string(svg_path).unwrap().starts_with("<svg"));

    let pixmap = tiny_skia::Pixmap::decode_png(&std::fs::read(png_path).unwrap()).unwrap();
    assert_eq!((pixmap.width(), pixmap.height()), (80, 40));
}
