//! Label sanitization
//!
//! Free text inside `[box]` and `{decision}` delimiters is the most common
//! source of engine syntax errors: parentheses, colons, quotes and
//! ampersands all have meaning to the engine's grammar. Each label is
//! rewritten into plain, bounded text.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, span, Level};

use crate::core::{LabelKind, NormalizerConfig};

static PARENTHESIZED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^()]*\)").unwrap());

static BOX_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\[\]\n]*)\]").unwrap());

static DECISION_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}\n]*)\}").unwrap());

const QUOTES: &[char] = &['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

const ELLIPSIS: &str = "...";

/// Remove parenthesized sub-strings, innermost first, until none remain.
fn strip_parenthesized(label: &str) -> String {
    let mut current = label.to_string();
    loop {
        let next = PARENTHESIZED_RE.replace_all(&current, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut a label to `max` characters, ending in an ellipsis.
fn truncate_label(label: String, max: usize) -> String {
    if label.chars().count() <= max {
        return label;
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let head: String = label.chars().take(keep).collect();
    format!("{}{}", head.trim_end(), ELLIPSIS)
}

/// Clean a single label captured from inside a delimiter pair.
///
/// The result is never empty, holds no quote or ampersand, holds no colon
/// unless the label is a URL, and is at most `config.max_label_chars`
/// characters long.
///
/// # Example
/// ```
/// use mermend::core::{LabelKind, NormalizerConfig};
/// use mermend::passes::sanitize_label;
///
/// let config = NormalizerConfig::default();
/// assert_eq!(sanitize_label("Q&A (draft)", LabelKind::Box, &config), "QandA");
/// assert_eq!(sanitize_label("  ", LabelKind::Decision, &config), "Decision");
/// ```
pub fn sanitize_label(label: &str, kind: LabelKind, config: &NormalizerConfig) -> String {
    let mut text = strip_parenthesized(label);

    if !text.to_ascii_lowercase().contains("http") {
        text = text.replace(':', " -");
    }

    text.retain(|c| !QUOTES.contains(&c));
    let text = text.replace('&', "and");
    let text = truncate_label(collapse_whitespace(&text), config.max_label_chars);

    if text.is_empty() {
        kind.placeholder().to_string()
    } else {
        text
    }
}

fn sanitize_kind(line: &str, kind: LabelKind, config: &NormalizerConfig) -> String {
    let pattern = match kind {
        LabelKind::Box => &*BOX_LABEL_RE,
        LabelKind::Decision => &*DECISION_LABEL_RE,
    };
    let (open, close) = kind.delimiters();

    pattern
        .replace_all(line, |caps: &Captures<'_>| {
            format!("{open}{}{close}", sanitize_label(&caps[1], kind, config))
        })
        .into_owned()
}

/// Sanitize every box and decision label in the text.
///
/// Comment lines, including `%%{init: ...}%%` directives, are left as is.
pub fn sanitize_labels(text: &str, config: &NormalizerConfig) -> String {
    let labels_span = span!(Level::DEBUG, "sanitize_labels", input_len = text.len());
    let _enter = labels_span.enter();

    let out = text
        .lines()
        .map(|line| {
            if line.trim_start().starts_with("%%") {
                line.to_string()
            } else {
                let boxed = sanitize_kind(line, LabelKind::Box, config);
                sanitize_kind(&boxed, LabelKind::Decision, config)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    debug!(output_len = out.len(), "Label sanitization completed");
    out
}
