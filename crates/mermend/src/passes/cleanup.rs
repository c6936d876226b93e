//! Text cleanup passes that bracket the structural repairs
//!
//! Generated markup often arrives JSON-escaped (`\n` as two characters),
//! wrapped in a Markdown code fence, or padded with blank lines.

const FENCE: &str = "```";

/// Turn escaped line breaks into real ones and unify line endings.
pub fn decode_line_breaks(text: &str) -> String {
    text.replace("\\r\\n", "\n")
        .replace("\\r", "\n")
        .replace("\\n", "\n")
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

/// Remove a surrounding Markdown code fence, if present.
///
/// The opening fence line may carry a language tag (```` ```mermaid ````).
/// Text that does not start with a fence is returned unchanged.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with(FENCE) {
        return text.to_string();
    }

    let body = match trimmed.split_once('\n') {
        Some((_, rest)) => rest,
        None => "",
    };
    let body = body.trim_end();
    body.strip_suffix(FENCE).unwrap_or(body).to_string()
}

/// Drop whitespace-only lines.
pub fn collapse_blank_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
