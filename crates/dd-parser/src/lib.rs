//! Error-tolerant concrete syntax tree for Daedalus sources.
//!
//! The tree mirrors the node kinds and field names of the Daedalus
//! tree-sitter grammar so that analysis code can walk it the same way.

mod lexer;
mod parser;
mod syntax;

pub use lexer::{tokenize, Token, TokenKind};
pub use parser::parse;
pub use syntax::{Field, Node, NodeKind, SyntaxTree};
