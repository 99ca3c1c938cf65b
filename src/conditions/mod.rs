//! Conditional requests (`If` header, RFC 4918 §10.4).
//!
//! The header is parsed into an [`IfHeader`] AST by [`parse`] and checked
//! against live lock and entity-tag state by [`evaluate`]. A false result maps
//! to `412 Precondition Failed`; proving ownership of a lock is the method
//! guard's concern, not the evaluator's.

mod evaluator;
mod parser;
mod types;

#[cfg(test)]
mod tests;

pub use evaluator::{evaluate, ConditionState};
pub use parser::parse;
pub use types::{Condition, ConditionKind, ConditionList, IfHeader, TaggedConditionList};
