//! Core type definitions for markup repair
//!
//! This module contains the fundamental types used throughout mermend:
//! edge operators, label delimiters, and the configuration of each stage.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Indentation used for statements emitted by the line repairer
pub const DEFAULT_INDENT: &str = "    ";

/// Longest label (in characters) the label sanitizer lets through
pub const DEFAULT_MAX_LABEL_CHARS: usize = 30;

/// Node tokens of this many characters or more are rejected by the line repairer
pub const DEFAULT_MAX_NODE_CHARS: usize = 50;

/// Quiet period before a changed source is rendered
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// The three canonical edge operators the repair passes emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeOperator {
    /// `-->`
    Forward,
    /// `<--`
    Reverse,
    /// `<-->`
    Bidirectional,
}

impl EdgeOperator {
    /// All operators, longest first (the order they must be matched in)
    pub const ALL: [EdgeOperator; 3] = [
        EdgeOperator::Bidirectional,
        EdgeOperator::Forward,
        EdgeOperator::Reverse,
    ];

    /// The operator token as it appears in markup
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeOperator::Forward => "-->",
            EdgeOperator::Reverse => "<--",
            EdgeOperator::Bidirectional => "<-->",
        }
    }
}

impl fmt::Display for EdgeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EdgeOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("Unknown edge operator: {}", s))
    }
}

/// Delimiter style a label was captured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    /// Square-bracket box label: `A[label]`
    Box,
    /// Curly-brace decision label: `A{label}`
    Decision,
}

impl LabelKind {
    /// Opening and closing delimiter characters
    pub fn delimiters(&self) -> (char, char) {
        match self {
            LabelKind::Box => ('[', ']'),
            LabelKind::Decision => ('{', '}'),
        }
    }

    /// Text substituted when a label sanitizes down to nothing
    pub fn placeholder(&self) -> &'static str {
        match self {
            LabelKind::Box => "Node",
            LabelKind::Decision => "Decision",
        }
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelKind::Box => write!(f, "box"),
            LabelKind::Decision => write!(f, "decision"),
        }
    }
}

/// Tunables for the markup normalizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Indentation for statements re-emitted by the line repairer
    pub indent: String,
    /// Upper bound on sanitized label length, in characters
    pub max_label_chars: usize,
    /// Node tokens must be shorter than this to survive line repair
    pub max_node_chars: usize,
}

impl NormalizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Values below 4 are raised to 4 so an ellipsis always fits.
    pub fn with_max_label_chars(mut self, max: usize) -> Self {
        self.max_label_chars = max.max(4);
        self
    }

    pub fn with_max_node_chars(mut self, max: usize) -> Self {
        self.max_node_chars = max;
        self
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT.to_string(),
            max_label_chars: DEFAULT_MAX_LABEL_CHARS,
            max_node_chars: DEFAULT_MAX_NODE_CHARS,
        }
    }
}

/// Configuration for the render pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Quiet period the live driver waits for before rendering
    pub debounce: Duration,
    /// Normalizer settings applied on every render
    pub normalizer: NormalizerConfig,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_normalizer(mut self, normalizer: NormalizerConfig) -> Self {
        self.normalizer = normalizer;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            normalizer: NormalizerConfig::default(),
        }
    }
}
