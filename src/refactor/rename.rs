//! In-place rename of a freshly introduced binding.
//!
//! A rename session starts after the extraction has been committed. Each
//! [`update`](RenameSession::update) renames the binding together with its
//! linked references in one transaction, so the document never shows them
//! out of sync. Cancelling restores the placeholder name; the extraction
//! itself stays.

use tracing::debug;

use super::rewriter::PostRefactoringState;
use crate::error::{RefactorError, Result};
use crate::factory::NodeFactory;
use crate::lang::Language;
use crate::syntax::{Document, SyntaxNode, SyntaxTree};

/// Returns true if `node` can start an in-place rename.
pub fn is_inplace_rename_available(
    lang: &dyn Language,
    tree: &SyntaxTree,
    node: SyntaxNode,
) -> bool {
    lang.is_pattern_binding(tree, node)
}

/// A running rename over one binding and its references.
#[derive(Debug)]
pub struct RenameSession<'a> {
    lang: &'a dyn Language,
    binding: SyntaxNode,
    references: Vec<SyntaxNode>,
    placeholder: String,
    current: String,
}

impl<'a> RenameSession<'a> {
    pub fn start(
        lang: &'a dyn Language,
        document: &Document,
        state: &PostRefactoringState,
        placeholder: &str,
    ) -> Result<Self> {
        let tree = document.tree();
        if !tree.is_valid(state.binding)
            || !state.inserted_references.iter().all(|&r| tree.is_valid(r))
        {
            return Err(RefactorError::StaleSelection);
        }
        if !is_inplace_rename_available(lang, tree, state.binding) {
            return Err(RefactorError::TransformFailed {
                message: "the binding cannot be renamed in place".to_string(),
            });
        }

        debug!(
            placeholder,
            references = state.inserted_references.len(),
            "started rename"
        );
        Ok(Self {
            lang,
            binding: state.binding,
            references: state.inserted_references.clone(),
            placeholder: placeholder.to_string(),
            current: tree.text(state.binding)?,
        })
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// The name currently in the document.
    pub fn current_name(&self) -> &str {
        &self.current
    }

    pub fn binding(&self) -> SyntaxNode {
        self.binding
    }

    pub fn references(&self) -> &[SyntaxNode] {
        &self.references
    }

    /// Renames the binding and all linked references to `new_name`.
    pub fn update(&mut self, document: &mut Document, new_name: &str) -> Result<()> {
        let ident = NodeFactory::new(self.lang).identifier(new_name)?;

        let (binding, references) = document.transaction("rename", |tree| {
            let binding = tree.replace(self.binding, &ident)?;
            let references = self
                .references
                .iter()
                .map(|&reference| tree.replace(reference, &ident))
                .collect::<Result<Vec<_>>>()?;
            Ok((binding, references))
        })?;

        debug!(from = %self.current, to = new_name, "renamed binding");
        self.binding = binding;
        self.references = references;
        self.current = new_name.to_string();
        Ok(())
    }

    /// Ends the session, keeping the current name.
    pub fn finish(self) -> String {
        debug!(name = %self.current, "finished rename");
        self.current
    }

    /// Ends the session and puts the placeholder name back.
    pub fn cancel(mut self, document: &mut Document) -> Result<()> {
        if self.current != self.placeholder {
            let placeholder = self.placeholder.clone();
            self.update(document, &placeholder)?;
        }
        debug!("cancelled rename");
        Ok(())
    }
}
