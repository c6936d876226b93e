//! Line repair
//!
//! The target engine accepts at most one edge operator per statement, while
//! generated markup often chains `A --> B --> C` on a single line. Such lines
//! are split into one statement per consecutive node pair.

use tracing::{debug, span, warn, Level};

use crate::core::{split_edge_chain, EdgeOperator, NormalizerConfig};

/// Keywords that open a diagram of a given type
const DIAGRAM_KEYWORDS: &[&str] = &[
    "graph",
    "flowchart",
    "sequencediagram",
    "classdiagram",
    "statediagram",
    "statediagram-v2",
    "erdiagram",
    "gantt",
    "pie",
    "journey",
    "gitgraph",
    "mindmap",
    "timeline",
    "quadrantchart",
    "requirementdiagram",
    "c4context",
    "sankey-beta",
    "xychart-beta",
    "block-beta",
];

const GROUP_KEYWORD: &str = "subgraph";
const GROUP_END_KEYWORD: &str = "end";
const COMMENT_PREFIX: &str = "%%";

/// Output of the line repairer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepairedLines {
    pub text: String,
    /// Lines that held more than one operator and were rewritten
    pub split_lines: usize,
    /// Node pairs discarded because one side failed the sanity check
    pub dropped_pairs: usize,
}

/// True for lines exempt from splitting: diagram headers, subgraph open and
/// close, and comments.
pub fn is_directive_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with(COMMENT_PREFIX) {
        return true;
    }

    let first = trimmed
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_end_matches(';')
        .to_ascii_lowercase();

    first == GROUP_KEYWORD || first == GROUP_END_KEYWORD || DIAGRAM_KEYWORDS.contains(&first.as_str())
}

/// Count edge operators on a line
pub fn operator_count(line: &str) -> usize {
    split_edge_chain(line).operator_count()
}

/// A segment between two operators: an optional leading `|label|` that
/// belongs to the operator before it, then the node token itself.
fn split_segment(segment: &str) -> (Option<&str>, &str) {
    let trimmed = segment.trim();
    if let Some(rest) = trimmed.strip_prefix('|') {
        if let Some((label, node)) = rest.split_once('|') {
            return (Some(label), node.trim());
        }
    }
    (None, trimmed)
}

fn node_is_sane(node: &str, config: &NormalizerConfig) -> bool {
    !node.is_empty() && node.chars().count() < config.max_node_chars
}

/// Rewrite a multi-operator line as one statement per node pair.
///
/// Returns the emitted statements and the number of dropped pairs.
fn split_line(line: &str, config: &NormalizerConfig) -> (Vec<String>, usize) {
    let chain = split_edge_chain(line);
    let (_, head) = split_segment(chain.head);

    let mut statements = Vec::with_capacity(chain.links.len());
    let mut dropped = 0;
    let mut from = head;

    for (op, segment) in &chain.links {
        let (label, to) = split_segment(segment);
        if node_is_sane(from, config) && node_is_sane(to, config) {
            statements.push(format_statement(&config.indent, from, *op, label, to));
        } else {
            dropped += 1;
        }
        from = to;
    }

    (statements, dropped)
}

fn format_statement(
    indent: &str,
    from: &str,
    op: EdgeOperator,
    label: Option<&str>,
    to: &str,
) -> String {
    match label {
        Some(label) => format!("{indent}{from} {op}|{label}| {to}"),
        None => format!("{indent}{from} {op} {to}"),
    }
}

/// Split every line carrying more than one edge operator.
///
/// Empty and directive lines pass through, as do lines with at most one
/// operator.
pub fn repair_lines(text: &str, config: &NormalizerConfig) -> RepairedLines {
    let lines_span = span!(Level::DEBUG, "repair_lines", input_len = text.len());
    let _enter = lines_span.enter();

    let mut out: Vec<String> = Vec::new();
    let mut split_lines = 0;
    let mut dropped_pairs = 0;

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() || is_directive_line(line) || operator_count(line) <= 1 {
            out.push(line.to_string());
            continue;
        }

        let (statements, dropped) = split_line(line, config);
        debug!(
            line = index + 1,
            statements = statements.len(),
            dropped,
            "Split chained edge line"
        );
        if dropped > 0 {
            warn!(
                line = index + 1,
                dropped, "Dropped malformed node pairs while splitting line"
            );
        }

        split_lines += 1;
        dropped_pairs += dropped;
        out.extend(statements);
    }

    RepairedLines {
        text: out.join("\n"),
        split_lines,
        dropped_pairs,
    }
}
