//! Arrow normalization
//!
//! Later passes key off exact operator strings, so arrow syntax is made
//! consistent first. Non-ASCII arrow glyphs map to the canonical operators,
//! every other non-ASCII character is dropped, and the broken fragments that
//! dropping leaves behind (`A <—> B` becomes `A <> B`) are repaired.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, span, trace, Level};

use crate::core::EdgeOperator;

/// Damaged operators, most specific alternative first.
///
/// Regex alternation is leftmost-first, so a bidirectional fragment is always
/// claimed before either unidirectional rule can split it in two.
static FRAGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<bi><[ \t]*-*[ \t]*>|>[ \t]+<)|(?P<fwd>-+[ \t]+>)|(?P<rev><[ \t]+-+)").unwrap()
});

/// Canonical operator for an arrow glyph, if the character is one
fn glyph_operator(c: char) -> Option<EdgeOperator> {
    match c {
        '→' | '⟶' | '➔' | '➜' | '➝' | '➞' | '➡' | '⇒' | '⟹' | '⇨' | '⟼' => {
            Some(EdgeOperator::Forward)
        }
        '←' | '⟵' | '⇐' | '⟸' | '⇦' | '⬅' | '⟻' => Some(EdgeOperator::Reverse),
        '↔' | '⟷' | '⇔' | '⟺' | '⇄' | '⇆' => Some(EdgeOperator::Bidirectional),
        _ => None,
    }
}

/// Map arrow glyphs to operators and drop all other non-ASCII characters.
///
/// Line breaks and tabs are ASCII and always survive.
pub fn map_glyphs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if let Some(op) = glyph_operator(c) {
            out.push_str(op.as_str());
        } else if c.is_ascii() {
            out.push(c);
        }
    }
    out
}

/// Rewrite operator fragments left behind by glyph stripping.
pub fn repair_fragments(text: &str) -> String {
    FRAGMENT_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let op = if caps.name("bi").is_some() {
                EdgeOperator::Bidirectional
            } else if caps.name("fwd").is_some() {
                EdgeOperator::Forward
            } else {
                EdgeOperator::Reverse
            };
            trace!(fragment = &caps[0], replacement = op.as_str(), "Repaired arrow fragment");
            op.as_str()
        })
        .into_owned()
}

/// Run the full arrow normalization sweep.
pub fn normalize_arrows(text: &str) -> String {
    let arrow_span = span!(Level::DEBUG, "normalize_arrows", input_len = text.len());
    let _enter = arrow_span.enter();

    let mapped = map_glyphs(text);
    let repaired = repair_fragments(&mapped);
    debug!(output_len = repaired.len(), "Arrow normalization completed");
    repaired
}
