//! Applies a [`RefactoringPlan`] to a document.

use tracing::{debug, info};

use super::planner::RefactoringPlan;
use crate::error::{RefactorError, Result};
use crate::factory::NodeFactory;
use crate::lang::Language;
use crate::syntax::{Document, SyntaxNode, SyntaxTree};

/// Nodes created by a successful rewrite, handed to the rename stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRefactoringState {
    /// The identifier bound by the inserted `let`.
    pub binding: SyntaxNode,
    /// The references that replaced the occurrences, in document order.
    pub inserted_references: Vec<SyntaxNode>,
}

pub struct TreeRewriter<'a> {
    lang: &'a dyn Language,
}

impl<'a> TreeRewriter<'a> {
    pub fn new(lang: &'a dyn Language) -> Self {
        Self { lang }
    }

    /// Inserts `let <name> = <target>;` before the anchor and replaces every
    /// occurrence with `<name>`.
    ///
    /// Runs as one transaction: on failure the document is left exactly as it
    /// was.
    pub fn rewrite(
        &self,
        document: &mut Document,
        plan: &RefactoringPlan,
    ) -> Result<PostRefactoringState> {
        let factory = NodeFactory::new(self.lang);

        let state = document.transaction("introduce variable", |tree| {
            let target_text = tree.text(plan.target)?;
            let mut occurrences = plan
                .occurrences
                .iter()
                .map(|&node| Ok((tree.range(node)?.start, node)))
                .collect::<Result<Vec<_>>>()?;
            occurrences.sort_by_key(|&(start, _)| start);

            let indent = indentation_of(tree, plan.anchor)?;
            let separator = tree.insert_before(plan.anchor, &factory.new_line(&indent))?;
            let declaration = factory
                .create_var_declaration(&plan.name, &target_text)
                .ok_or_else(|| {
                    RefactorError::synthesis(format!("a binding named '{}'", plan.name))
                })?;
            let declaration = tree.insert_before(separator, &declaration)?;

            let mut inserted_references = Vec::with_capacity(occurrences.len());
            for (_, occurrence) in occurrences {
                let reference = factory.create_expression(&plan.name).ok_or_else(|| {
                    RefactorError::synthesis(format!("a reference to '{}'", plan.name))
                })?;
                inserted_references.push(tree.replace(occurrence, &reference)?);
            }

            let binding = tree
                .child_by_field(declaration, "pattern")?
                .filter(|&pattern| self.lang.is_pattern_binding(tree, pattern))
                .ok_or_else(|| RefactorError::synthesis("a pattern binding"))?;
            debug!(references = inserted_references.len(), "replaced occurrences");

            Ok(PostRefactoringState {
                binding,
                inserted_references,
            })
        })?;

        info!(name = %plan.name, "introduced variable");
        Ok(state)
    }
}

/// The whitespace between the start of `node`'s line and `node`, or nothing
/// when `node` does not start its line.
fn indentation_of(tree: &SyntaxTree, node: SyntaxNode) -> Result<String> {
    let Some(parent) = tree.parent(node)? else {
        return Ok(String::new());
    };
    let siblings = tree.children(parent)?;
    let previous = siblings
        .iter()
        .position(|&child| child == node)
        .and_then(|at| at.checked_sub(1))
        .map(|at| siblings[at]);

    match previous {
        Some(gap) if tree.is_whitespace(gap)? => {
            let text = tree.text(gap)?;
            Ok(text
                .rfind('\n')
                .map(|line| text[line + 1..].to_string())
                .unwrap_or_default())
        }
        _ => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Rust;
    use crate::refactor::planner::ExtractionPlanner;
    use crate::syntax::SyntaxTree;

    fn find(tree: &SyntaxTree, kind: &str, text: &str) -> SyntaxNode {
        tree.descendants(tree.root())
            .unwrap()
            .find(|&n| tree.kind(n).unwrap() == kind && tree.text(n).unwrap() == text)
            .unwrap()
    }

    fn plan(document: &Document, kind: &str, text: &str) -> RefactoringPlan {
        let target = find(document.tree(), kind, text);
        ExtractionPlanner::new(&Rust)
            .plan(document.tree(), target)
            .unwrap()
    }

    #[test]
    fn test_rewrite_let_initializer() {
        let mut doc = Document::parse(&Rust, "fn main() { let x = 1 + 2; }").unwrap();
        let plan = plan(&doc, "binary_expression", "1 + 2");

        let state = TreeRewriter::new(&Rust).rewrite(&mut doc, &plan).unwrap();

        assert_eq!(doc.text(), "fn main() { let i = 1 + 2;\nlet x = i; }");
        assert_eq!(doc.tree().text(state.binding).unwrap(), "i");
        assert_eq!(state.inserted_references.len(), 1);
        assert_eq!(doc.tree().range(state.inserted_references[0]).unwrap().start, 35);
        assert_eq!(doc.revision(), 1);
    }

    #[test]
    fn test_rewrite_tail_expression() {
        let mut doc = Document::parse(&Rust, "fn f() -> i32 { 1 + 2 }").unwrap();
        let plan = plan(&doc, "binary_expression", "1 + 2");

        TreeRewriter::new(&Rust).rewrite(&mut doc, &plan).unwrap();

        assert_eq!(doc.text(), "fn f() -> i32 { let i = 1 + 2;\ni }");
    }

    #[test]
    fn test_rewrite_keeps_indentation() {
        let source = "fn main() {\n    if ok {\n        let total = price(3) * 2;\n    }\n}\n";
        let mut doc = Document::parse(&Rust, source).unwrap();
        let plan = plan(&doc, "call_expression", "price(3)");

        TreeRewriter::new(&Rust).rewrite(&mut doc, &plan).unwrap();

        assert_eq!(
            doc.text(),
            "fn main() {\n    if ok {\n        let i = price(3);\n        let total = i * 2;\n    }\n}\n"
        );
    }

    #[test]
    fn test_rewritten_document_reparses_to_original_initializer() {
        let mut doc = Document::parse(&Rust, "fn main() {\n    call(a.b(), 7);\n}\n").unwrap();
        let plan = plan(&doc, "call_expression", "a.b()");

        TreeRewriter::new(&Rust).rewrite(&mut doc, &plan).unwrap();

        let reparsed = Rust.parse_tree(&doc.text()).unwrap();
        assert!(!reparsed.has_errors(reparsed.root()).unwrap());
        let decl = reparsed
            .descendants(reparsed.root())
            .unwrap()
            .find(|&n| reparsed.kind(n).unwrap() == "let_declaration")
            .unwrap();
        let value = reparsed.child_by_field(decl, "value").unwrap().unwrap();
        let pattern = reparsed.child_by_field(decl, "pattern").unwrap().unwrap();
        assert_eq!(reparsed.text(pattern).unwrap(), "i");
        assert_eq!(reparsed.text(value).unwrap(), "a.b()");
    }

    #[test]
    fn test_failed_synthesis_leaves_document_untouched() {
        let source = "fn main() { let x = 1 + 2; }";
        let mut doc = Document::parse(&Rust, source).unwrap();
        let mut plan = plan(&doc, "binary_expression", "1 + 2");
        plan.name = "two words".to_string();

        let result = TreeRewriter::new(&Rust).rewrite(&mut doc, &plan);

        assert!(matches!(result, Err(RefactorError::SynthesisFailed { .. })));
        assert_eq!(doc.text(), source);
        assert_eq!(doc.revision(), 0);
        assert!(doc.tree().is_valid(plan.target));
    }

    #[test]
    fn test_stale_plan() {
        let source = "fn main() { let x = 1 + 2; }";
        let mut doc = Document::parse(&Rust, source).unwrap();
        let plan = plan(&doc, "binary_expression", "1 + 2");
        let rewriter = TreeRewriter::new(&Rust);
        rewriter.rewrite(&mut doc, &plan).unwrap();
        let after_first = doc.text();

        let result = rewriter.rewrite(&mut doc, &plan);

        assert!(matches!(result, Err(RefactorError::StaleSelection)));
        assert_eq!(doc.text(), after_first);
    }
}
