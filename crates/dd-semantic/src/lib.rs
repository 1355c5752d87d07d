//! Two-pass semantic analysis of Daedalus syntax trees.
//!
//! Pass one registers every declaration so forward references resolve;
//! pass two links dialog properties to functions and classifies bodies
//! into actions and conditions.

pub mod actions;
pub mod arguments;
pub mod conditions;
pub mod context;
pub mod declarations;
pub mod diagnostics;
pub mod linking;
pub mod literal;
mod pipeline;

pub use context::BuildContext;
pub use declarations::collect_declarations;
pub use diagnostics::collect_syntax_errors;
pub use linking::link_and_analyze;
pub use pipeline::{build_semantic_model, parse_semantic_model};

#[cfg(test)]
mod tests;
