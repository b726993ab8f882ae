//! Extraction planning: where the new binding goes and what it replaces.

use tracing::debug;

use crate::error::{RefactorError, Result};
use crate::factory::NodeFactory;
use crate::lang::Language;
use crate::syntax::{SyntaxNode, SyntaxTree};

/// Name given to a fresh binding until the user renames it.
pub const DEFAULT_PLACEHOLDER: &str = "i";

/// Everything the rewriter needs to perform one extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefactoringPlan {
    /// Name of the new binding.
    pub name: String,
    /// The expression being extracted.
    pub target: SyntaxNode,
    /// Nodes replaced by a reference to the binding. Currently always `[target]`.
    pub occurrences: Vec<SyntaxNode>,
    /// Statement the binding is inserted before.
    pub anchor: SyntaxNode,
}

pub struct ExtractionPlanner<'a> {
    lang: &'a dyn Language,
    placeholder: String,
}

impl<'a> ExtractionPlanner<'a> {
    pub fn new(lang: &'a dyn Language) -> Self {
        Self {
            lang,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    /// Uses `name` for new bindings instead of [`DEFAULT_PLACEHOLDER`].
    pub fn with_placeholder(mut self, name: impl Into<String>) -> Self {
        self.placeholder = name.into();
        self
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Plans the extraction of `target`.
    ///
    /// `target` usually comes from a chooser that ran some time after the
    /// candidates were collected, so block and anchor are located again here.
    pub fn plan(&self, tree: &SyntaxTree, target: SyntaxNode) -> Result<RefactoringPlan> {
        if !tree.is_valid(target) {
            return Err(RefactorError::StaleSelection);
        }

        NodeFactory::new(self.lang).identifier(&self.placeholder)?;

        let anchor = self.find_anchor(tree, target)?;
        debug!(
            target = %tree.range(target)?,
            anchor = %tree.range(anchor)?,
            name = %self.placeholder,
            "planned extraction"
        );

        Ok(RefactoringPlan {
            name: self.placeholder.clone(),
            target,
            occurrences: vec![target],
            anchor,
        })
    }

    /// The statement of the nearest enclosing block that contains `target`.
    pub fn find_anchor(&self, tree: &SyntaxTree, target: SyntaxNode) -> Result<SyntaxNode> {
        let block = tree
            .nearest_ancestor(target, |node| self.lang.is_block(tree, node))?
            .ok_or(RefactorError::NoEnclosingBlock)?;

        let child_of_block = tree
            .ancestors(target)?
            .find(|&node| matches!(tree.parent(node), Ok(Some(parent)) if parent == block))
            .ok_or(RefactorError::NoAnchor)?;

        if self.lang.is_statement(tree, child_of_block) {
            Ok(child_of_block)
        } else {
            Err(RefactorError::NoAnchor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Rust;
    use crate::syntax::SyntaxFragment;

    fn parse(source: &str) -> SyntaxTree {
        Rust.parse_tree(source).unwrap()
    }

    fn find(tree: &SyntaxTree, kind: &str, text: &str) -> SyntaxNode {
        tree.descendants(tree.root())
            .unwrap()
            .find(|&n| tree.kind(n).unwrap() == kind && tree.text(n).unwrap() == text)
            .unwrap()
    }

    #[test]
    fn test_plan_let_initializer() {
        let tree = parse("fn main() { let x = 1 + 2; }");
        let target = find(&tree, "binary_expression", "1 + 2");

        let plan = ExtractionPlanner::new(&Rust).plan(&tree, target).unwrap();

        assert_eq!(plan.name, "i");
        assert_eq!(plan.target, target);
        assert_eq!(plan.occurrences, vec![target]);
        assert_eq!(tree.text(plan.anchor).unwrap(), "let x = 1 + 2;");
    }

    #[test]
    fn test_anchor_is_ancestor_and_child_of_block() {
        let tree = parse("fn main() { if ready { run(a * b); } }");
        let target = find(&tree, "binary_expression", "a * b");

        let plan = ExtractionPlanner::new(&Rust).plan(&tree, target).unwrap();

        assert!(tree.ancestors(target).unwrap().any(|n| n == plan.anchor));
        let parent = tree.parent(plan.anchor).unwrap().unwrap();
        assert_eq!(tree.text(parent).unwrap(), "{ run(a * b); }");
    }

    #[test]
    fn test_tail_expression_is_its_own_anchor() {
        let tree = parse("fn f() -> i32 { 1 + 2 }");
        let target = find(&tree, "binary_expression", "1 + 2");

        let plan = ExtractionPlanner::new(&Rust).plan(&tree, target).unwrap();
        assert_eq!(plan.anchor, target);
    }

    #[test]
    fn test_item_inside_block_has_no_anchor() {
        let tree = parse("fn main() { const N: u32 = 4 * 2; }");
        let target = find(&tree, "binary_expression", "4 * 2");

        let result = ExtractionPlanner::new(&Rust).plan(&tree, target);
        assert!(matches!(result, Err(RefactorError::NoAnchor)));
    }

    #[test]
    fn test_stale_target() {
        let mut tree = parse("fn main() { let x = 1 + 2; }");
        let target = find(&tree, "binary_expression", "1 + 2");
        let replacement = Rust.parse_tree("fn main() { 3; }").unwrap();
        let literal = find(&replacement, "integer_literal", "3");
        tree.replace(target, &SyntaxFragment::new(replacement, literal))
            .unwrap();

        let result = ExtractionPlanner::new(&Rust).plan(&tree, target);
        assert!(matches!(result, Err(RefactorError::StaleSelection)));
    }

    #[test]
    fn test_invalid_placeholder() {
        let tree = parse("fn main() { let x = 1 + 2; }");
        let target = find(&tree, "binary_expression", "1 + 2");

        let planner = ExtractionPlanner::new(&Rust).with_placeholder("not valid");
        let result = planner.plan(&tree, target);
        assert!(matches!(result, Err(RefactorError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_custom_placeholder() {
        let tree = parse("fn main() { let x = 1 + 2; }");
        let target = find(&tree, "binary_expression", "1 + 2");

        let plan = ExtractionPlanner::new(&Rust)
            .with_placeholder("sum")
            .plan(&tree, target)
            .unwrap();
        assert_eq!(plan.name, "sum");
    }
}
