//! Diagnostic locations for parse and evaluation errors

pub mod location;

pub use location::{LineIndex, Position, SourceLocation};
