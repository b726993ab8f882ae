//! Candidate collection: which expressions around the cursor can be extracted.

use tracing::debug;

use crate::error::{RefactorError, Result};
use crate::lang::Language;
use crate::syntax::{SyntaxNode, SyntaxTree, TextRange};

/// What the user pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// An explicit selection. Surrounding whitespace is ignored.
    Range(TextRange),
    /// A caret offset with nothing selected.
    Caret(usize),
}

impl Selection {
    /// A caret selection is used for empty ranges.
    pub fn from_range(range: TextRange) -> Self {
        if range.is_empty() {
            Selection::Caret(range.start)
        } else {
            Selection::Range(range)
        }
    }
}

/// Expressions that may be extracted, innermost first.
///
/// Every expression is an ancestor-or-self of the expression the selection
/// resolved to and a strict descendant of [`block`](Self::block).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionCandidate {
    expressions: Vec<SyntaxNode>,
    block: SyntaxNode,
}

impl ExtractionCandidate {
    pub fn expressions(&self) -> &[SyntaxNode] {
        &self.expressions
    }

    /// The expression the selection resolved to.
    pub fn innermost(&self) -> SyntaxNode {
        self.expressions[0]
    }

    /// The block bounding the candidates.
    pub fn block(&self) -> SyntaxNode {
        self.block
    }

    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.expressions.iter().copied()
    }
}

/// Resolves a selection to the chain of extractable expressions.
pub struct CandidateCollector<'a> {
    lang: &'a dyn Language,
}

impl<'a> CandidateCollector<'a> {
    pub fn new(lang: &'a dyn Language) -> Self {
        Self { lang }
    }

    pub fn collect(&self, tree: &SyntaxTree, selection: Selection) -> Result<ExtractionCandidate> {
        let expression = match selection {
            Selection::Range(range) => self.expression_in_range(tree, range)?,
            Selection::Caret(offset) => self.expression_at_caret(tree, offset)?,
        }
        .ok_or(RefactorError::NoExpressionFound)?;

        let block = tree
            .nearest_ancestor(expression, |node| self.lang.is_block(tree, node))?
            .ok_or(RefactorError::NoEnclosingBlock)?;

        let expressions: Vec<SyntaxNode> = tree
            .ancestors(expression)?
            .take_while(|&node| node != block)
            .filter(|&node| self.lang.is_expression(tree, node))
            .collect();

        debug!(
            ?selection,
            candidates = expressions.len(),
            "collected extraction candidates"
        );
        Ok(ExtractionCandidate { expressions, block })
    }

    /// The expression spanning exactly the trimmed `range`.
    fn expression_in_range(
        &self,
        tree: &SyntaxTree,
        range: TextRange,
    ) -> Result<Option<SyntaxNode>> {
        let text = tree.text(tree.root())?;
        let range = range.trim_whitespace(&text);
        if range.is_empty() {
            return Ok(None);
        }

        let (Some(first), Some(last)) = (tree.leaf_at(range.start), tree.leaf_at(range.end - 1))
        else {
            return Ok(None);
        };
        let Some(common) = tree.common_ancestor(first, last)? else {
            return Ok(None);
        };
        let Some(expression) = self.expression_ancestor_or_self(tree, common)? else {
            return Ok(None);
        };

        Ok((tree.range(expression)? == range).then_some(expression))
    }

    /// The innermost expression covering the character before the caret.
    fn expression_at_caret(
        &self,
        tree: &SyntaxTree,
        offset: usize,
    ) -> Result<Option<SyntaxNode>> {
        if offset == 0 {
            return Ok(None);
        }
        let Some(leaf) = tree.leaf_at(offset - 1) else {
            return Ok(None);
        };
        if tree.is_whitespace(leaf)? {
            return Ok(None);
        }
        self.expression_ancestor_or_self(tree, leaf)
    }

    fn expression_ancestor_or_self(
        &self,
        tree: &SyntaxTree,
        node: SyntaxNode,
    ) -> Result<Option<SyntaxNode>> {
        Ok(tree
            .ancestors(node)?
            .find(|&n| self.lang.is_expression(tree, n)))
    }
}
