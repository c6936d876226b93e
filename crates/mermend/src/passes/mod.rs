//! Repair passes run by the markup normalizer
//!
//! Each pass is a total function over strings and can be used on its own.
//! The [`Normalizer`](crate::normalizer::Normalizer) composes them in a
//! fixed order.

pub mod arrows;
pub mod cleanup;
pub mod labels;
pub mod lines;

pub use arrows::normalize_arrows;
pub use cleanup::{collapse_blank_lines, decode_line_breaks, strip_code_fence};
pub use labels::{sanitize_label, sanitize_labels};
pub use lines::{is_directive_line, operator_count, repair_lines, RepairedLines};
