//! Immutable diagram source snapshots

use std::fmt;
use std::sync::Arc;

/// Raw, untrusted diagram markup as supplied by an author or a generator.
///
/// A source is never edited in place: every edit or regeneration produces a
/// new snapshot, which is what the render pipeline keys its cycles on.
/// Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagramSource {
    text: Arc<str>,
}

impl DiagramSource {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Text for a "copy code" action.
    ///
    /// This is always the raw source, never the normalized or rendered form,
    /// so the original markup can be inspected and fixed by hand.
    pub fn copy_code(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl From<&str> for DiagramSource {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DiagramSource {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for DiagramSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
