//! Tests for public API functions in lib.rs

use mermend::prelude::*;
use mermend::{normalize, EdgeOperator};

#[test]
fn test_normalize_mixed_repairs() {
    let input = "```mermaid\nflowchart TD\nStart[\"Begin: now\"] ⟶ Check{Ready & set?}\nCheck -- > Done[(Finish)]\n```";
    let markup = normalize(input);
    assert_eq!(
        markup,
        "flowchart TD\nStart[Begin - now] --> Check{Ready and set?}\nCheck --> Done[Node]"
    );
}

#[test]
fn test_escaped_line_breaks() {
    let markup = normalize("graph TD\\nA --> B\\r\\nB --> C");
    assert_eq!(markup, "graph TD\nA --> B\nB --> C");
}

#[test]
fn test_normalizer_reports_splits() {
    let normalized = Normalizer::new().normalize("graph TD\nA → B → C → D\nE --> F");
    assert_eq!(normalized.report.split_lines, 1);
    assert_eq!(normalized.report.dropped_pairs, 0);
    assert_eq!(normalized.markup.lines().count(), 5);
}

#[test]
fn test_sequence_diagrams_pass_through() {
    let input = "sequenceDiagram\n    Alice->>Bob: Hello\n    Bob-->>Alice: Hi";
    assert_eq!(normalize(input), input);
}

#[test]
fn test_operator_reexport() {
    assert_eq!(EdgeOperator::Bidirectional.as_str(), "<-->");
    assert_eq!("<--".parse::<EdgeOperator>(), Ok(EdgeOperator::Reverse));
}

#[test]
fn test_pipeline_config_defaults() {
    let config = PipelineConfig::default();
    assert_eq!(config.debounce.as_millis(), 300);
    assert_eq!(config.normalizer.max_label_chars, 30);
    assert_eq!(config.normalizer.max_node_chars, 50);
    assert_eq!(config.normalizer.indent, "    ");
}

#[test]
fn test_viewer_through_pipeline() {
    let mut pipeline = RenderPipeline::new();
    pipeline.viewer_mut().zoom_in();
    assert_eq!(pipeline.viewer().zoom(), 1.25);
    pipeline.load(DiagramSource::new("A --> B"));
    assert_eq!(pipeline.viewer().zoom(), 1.0);
}
