//! Core types shared by the normalizer passes, the render pipeline and export
//!
//! This module holds the vocabulary of the crate: edge operators, label kinds,
//! the immutable diagram source snapshot, configuration, and errors.

mod chumsky_utils;
mod error;
pub mod logging;
mod source;
mod types;

pub use chumsky_utils::*;
pub use error::*;
pub use logging::*;
pub use source::*;
pub use types::*;
