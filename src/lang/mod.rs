//! Language abstraction: grammar, parsing, and node classification.

mod rust;

pub use rust::Rust;

use crate::error::{RefactorError, Result};
use crate::syntax::{SyntaxNode, SyntaxTree};
use std::fmt;
use std::path::Path;
use tree_sitter::{Language as TsLanguage, Parser, Tree};

/// A programming language the engine can refactor.
///
/// Besides the tree-sitter grammar, a language classifies nodes into the
/// categories the refactorings reason about: expressions, statements, blocks,
/// and pattern bindings. Components receive the language as an explicit
/// `&dyn Language` capability.
pub trait Language: Send + Sync {
    /// Returns the name of the language.
    fn name(&self) -> &'static str;

    /// Returns the file extensions associated with this language.
    fn extensions(&self) -> &[&'static str];

    /// Returns the tree-sitter language grammar.
    fn grammar(&self) -> TsLanguage;

    /// Parses source code into a tree-sitter AST.
    fn parse(&self, source: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.grammar())
            .map_err(|e| RefactorError::Parse {
                path: Path::new("<source>").to_path_buf(),
                message: format!("Failed to set language: {e}"),
            })?;

        parser.parse(source, None).ok_or_else(|| RefactorError::Parse {
            path: Path::new("<source>").to_path_buf(),
            message: "Failed to parse source".to_string(),
        })
    }

    /// Parses source code into an arena syntax tree.
    fn parse_tree(&self, source: &str) -> Result<SyntaxTree> {
        let tree = self.parse(source)?;
        Ok(SyntaxTree::from_tree_sitter(&tree, source))
    }

    /// Parses a synthesized snippet. Returns `None` if the snippet does not
    /// parse cleanly.
    fn parse_fragment(&self, text: &str) -> Option<SyntaxTree> {
        let tree = self.parse_tree(text).ok()?;
        match tree.has_errors(tree.root()) {
            Ok(false) => Some(tree),
            _ => None,
        }
    }

    /// Checks if this language handles the given file extension.
    fn matches_extension(&self, ext: &str) -> bool {
        self.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Node kinds that denote expressions in expression position.
    fn is_expression_kind(&self, kind: &str) -> bool;

    /// Node kinds that denote statements when they are direct children of a block.
    fn is_statement_kind(&self, kind: &str) -> bool;

    /// Node kinds that delimit a statement block.
    fn is_block_kind(&self, kind: &str) -> bool;

    /// Returns true if a `kind` node attached to a `parent_kind` node under
    /// `field` cannot be extracted: a name, pattern, type or path segment, a
    /// method callee or an assignment target.
    fn is_non_expression_position(
        &self,
        kind: &str,
        parent_kind: &str,
        field: Option<&str>,
    ) -> bool;

    /// Returns true if an identifier attached to a `parent_kind` node under
    /// `field` introduces a new binding.
    fn is_binding_position(&self, parent_kind: &str, field: Option<&str>) -> bool;

    /// The kind of plain identifiers.
    fn identifier_kind(&self) -> &'static str;

    fn is_expression(&self, tree: &SyntaxTree, node: SyntaxNode) -> bool {
        let Ok(kind) = tree.kind(node) else {
            return false;
        };
        if !self.is_expression_kind(kind) {
            return false;
        }
        let Ok(Some(parent)) = tree.parent(node) else {
            return false;
        };
        let parent_kind = tree.kind(parent).unwrap_or_default();
        let field = tree.field(node).ok().flatten();
        !self.is_non_expression_position(kind, parent_kind, field)
    }

    fn is_block(&self, tree: &SyntaxTree, node: SyntaxNode) -> bool {
        tree.kind(node).is_ok_and(|kind| self.is_block_kind(kind))
    }

    /// A statement is a direct child of a block that is either of a statement
    /// kind or the block's tail expression.
    fn is_statement(&self, tree: &SyntaxTree, node: SyntaxNode) -> bool {
        let Ok(Some(parent)) = tree.parent(node) else {
            return false;
        };
        if !self.is_block(tree, parent) {
            return false;
        }
        tree.kind(node)
            .is_ok_and(|kind| self.is_statement_kind(kind))
            || self.is_expression(tree, node)
    }

    /// Returns true if `node` is an identifier that introduces a binding, the
    /// only element an in-place rename can start from.
    fn is_pattern_binding(&self, tree: &SyntaxTree, node: SyntaxNode) -> bool {
        if tree.kind(node).ok() != Some(self.identifier_kind()) {
            return false;
        }
        let Ok(Some(parent)) = tree.parent(node) else {
            return false;
        };
        let parent_kind = tree.kind(parent).unwrap_or_default();
        let field = tree.field(node).ok().flatten();
        self.is_binding_position(parent_kind, field)
    }
}

impl fmt::Debug for dyn Language + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
