//! Detached subtrees produced by synthesis.

use super::tree::{SyntaxNode, SyntaxTree, WHITESPACE};

/// A subtree that is not part of any document yet.
///
/// A fragment owns the whole tree it was extracted from; grafting it with
/// [`SyntaxTree::replace`] or [`SyntaxTree::insert_before`] copies the subtree
/// rooted at [`SyntaxFragment::node`] into fresh arena slots of the target tree.
#[derive(Debug, Clone)]
pub struct SyntaxFragment {
    tree: SyntaxTree,
    node: SyntaxNode,
}

impl SyntaxFragment {
    pub(crate) fn new(tree: SyntaxTree, node: SyntaxNode) -> Self {
        Self { tree, node }
    }

    /// A single whitespace leaf, e.g. the newline separating statements.
    pub fn whitespace(text: &str) -> Self {
        let tree = SyntaxTree::leaf(WHITESPACE, text);
        let node = tree.root();
        Self { tree, node }
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn node(&self) -> SyntaxNode {
        self.node
    }

    pub fn kind(&self) -> &'static str {
        self.tree.kind(self.node).unwrap_or(WHITESPACE)
    }

    /// Rendered text of the extracted node.
    pub fn text(&self) -> String {
        self.tree.text(self.node).unwrap_or_default()
    }
}
