//! Syntax tree adapter.
//!
//! Source files are parsed with tree-sitter and converted into a
//! [`SyntaxTree`]: a lossless concrete syntax tree stored in a generational
//! arena. Nodes are addressed by [`SyntaxNode`] handles that are checked against
//! the slot generation on every access, so a handle captured before a mutation
//! either still names the same node or fails with
//! [`StaleSelection`](crate::error::RefactorError::StaleSelection).
//!
//! Mutation goes through [`Document::transaction`], which restores the previous
//! tree if the mutation fails part-way.

mod document;
mod fragment;
mod text;
mod tree;

pub use document::Document;
pub use fragment::SyntaxFragment;
pub use text::{LineIndex, Position, TextRange};
pub use tree::{Ancestors, Descendants, SyntaxNode, SyntaxTree, TEXT, WHITESPACE};
