//! Shared types for the Glint interpreter.
//!
//! This crate defines the typed AST consumed by the evaluator, source
//! spans, the tagged value model with its operator semantics, and the
//! opaque binding handles used by the per-node resolution cache.

mod span;
mod value;
pub mod ast;

pub use span::Span;
pub use value::{Value, ValueError, ValueResult};
