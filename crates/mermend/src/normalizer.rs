//! Markup normalizer
//!
//! The normalizer runs every repair pass over raw diagram text in a fixed
//! order, each pass consuming the full output of the previous one:
//! line-break decoding → code fence stripping → arrows → line repair →
//! labels → blank line removal → trim.
//!
//! Normalization is a pure function of its input: no hidden state, no
//! randomness, and running it twice gives the same text as running it once.

use tracing::{debug, info, span, warn, Level};

use crate::core::{DiagramSource, NormalizerConfig};
use crate::passes::{
    collapse_blank_lines, decode_line_breaks, normalize_arrows, repair_lines, sanitize_labels,
    strip_code_fence,
};

/// What the structural passes had to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepairReport {
    /// Chained edge lines that were split into single statements
    pub split_lines: usize,
    /// Node pairs discarded during splitting
    pub dropped_pairs: usize,
}

impl RepairReport {
    /// True when no edge statement was lost
    pub fn is_lossless(&self) -> bool {
        self.dropped_pairs == 0
    }
}

/// Normalized markup together with its repair report
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Normalized {
    pub markup: String,
    pub report: RepairReport,
}

impl Normalized {
    /// Empty markup is a terminal error for rendering
    pub fn is_empty(&self) -> bool {
        self.markup.is_empty()
    }
}

/// Composes the repair passes into one deterministic transformation
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Create a normalizer with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer with custom settings
    pub fn with_config(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize a diagram source snapshot
    pub fn normalize_source(&self, source: &DiagramSource) -> Normalized {
        self.normalize(source.as_str())
    }

    /// Run every pass over `input`
    pub fn normalize(&self, input: &str) -> Normalized {
        let normalize_span = span!(Level::INFO, "normalize", input_len = input.len());
        let _enter = normalize_span.enter();

        let decoded = decode_line_breaks(input);
        let unfenced = strip_code_fence(&decoded);
        let arrows = normalize_arrows(&unfenced);

        let repaired = repair_lines(&arrows, &self.config);
        let report = RepairReport {
            split_lines: repaired.split_lines,
            dropped_pairs: repaired.dropped_pairs,
        };
        debug!(
            split_lines = report.split_lines,
            dropped_pairs = report.dropped_pairs,
            "Line repair completed"
        );

        let labelled = sanitize_labels(&repaired.text, &self.config);
        let markup = collapse_blank_lines(&labelled).trim().to_string();

        if markup.is_empty() {
            warn!("Normalization produced empty markup");
        } else {
            info!(output_len = markup.len(), "Normalization completed");
        }

        Normalized { markup, report }
    }
}
