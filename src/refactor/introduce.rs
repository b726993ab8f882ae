//! The introduce-variable action.
//!
//! [`IntroduceVariableHandler::invoke`] drives the whole interaction:
//!
//! ```text
//! Idle -> Collecting -> Planning -> Rewriting -> AwaitingRename -> Idle
//! ```
//!
//! The editor side is abstracted behind [`HostUi`]. Any failure along the way
//! is reported once through [`HostUi::show_error`] and the handler returns to
//! `Idle`; the document is only changed by a committed rewrite.

use tracing::{debug, info, warn};

use super::collector::{CandidateCollector, ExtractionCandidate, Selection};
use super::operations::{
    RefactoringContext, RefactoringOperation, RefactoringPreview, RefactoringResult,
    ValidationResult,
};
use super::planner::ExtractionPlanner;
use super::rename::RenameSession;
use super::rewriter::TreeRewriter;
use crate::config::ExtractConfig;
use crate::diff::unified_diff;
use crate::error::{RefactorError, Result};
use crate::factory::NodeFactory;
use crate::lang::Language;
use crate::syntax::{Document, SyntaxNode, SyntaxTree};
use std::path::Path;

/// Shown in the chooser for a candidate whose node no longer exists.
pub const INVALID_EXPRESSION: &str = "<invalid expression>";

/// The editor facilities the handler needs.
pub trait HostUi {
    /// The current selection, or the caret if nothing is selected.
    fn selection(&self) -> Selection;

    /// Lets the user pick one of `options`, innermost expression first.
    /// `None` cancels the refactoring.
    fn choose_target(&mut self, options: &[String]) -> Option<usize>;

    /// Shows a refactoring error.
    fn show_error(&mut self, message: &str);

    /// Runs the in-place rename of the new binding to completion and returns
    /// the name it ended with.
    fn start_rename(&mut self, document: &mut Document, session: RenameSession<'_>)
    -> Result<String>;
}

/// Where the handler is in the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Idle,
    Collecting,
    Planning,
    Rewriting,
    AwaitingRename,
}

/// How an invocation ended.
#[derive(Debug)]
pub enum IntroduceOutcome {
    /// A binding named `name` was introduced.
    Introduced { name: String },
    /// The user dismissed the chooser.
    Cancelled,
    /// The error has already been shown to the user.
    Failed(RefactorError),
}

impl IntroduceOutcome {
    pub fn is_introduced(&self) -> bool {
        matches!(self, IntroduceOutcome::Introduced { .. })
    }
}

/// Extracts an expression into a new `let` binding.
pub struct IntroduceVariableHandler<'a> {
    lang: &'a dyn Language,
    config: ExtractConfig,
    name: Option<String>,
    state: EngineState,
}

impl<'a> IntroduceVariableHandler<'a> {
    pub fn new(lang: &'a dyn Language) -> Self {
        Self::with_config(lang, ExtractConfig::default())
    }

    pub fn with_config(lang: &'a dyn Language, config: ExtractConfig) -> Self {
        Self {
            lang,
            config,
            name: None,
            state: EngineState::Idle,
        }
    }

    /// Name the binding is renamed to when the refactoring runs as a
    /// non-interactive operation.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Runs the interactive refactoring against `document`.
    pub fn invoke(&mut self, document: &mut Document, host: &mut dyn HostUi) -> IntroduceOutcome {
        let outcome = match self.run(document, host) {
            Ok(Some(name)) => IntroduceOutcome::Introduced { name },
            Ok(None) => {
                debug!("target chooser cancelled");
                IntroduceOutcome::Cancelled
            }
            Err(err) => {
                warn!(error = %err, state = ?self.state, "cannot introduce variable");
                host.show_error(&err.to_string());
                IntroduceOutcome::Failed(err)
            }
        };
        self.transition(EngineState::Idle);
        outcome
    }

    fn run(&mut self, document: &mut Document, host: &mut dyn HostUi) -> Result<Option<String>> {
        if document.is_read_only() {
            return Err(RefactorError::ReadOnly(
                document.path().map(Path::to_path_buf).unwrap_or_default(),
            ));
        }

        self.transition(EngineState::Collecting);
        let candidate = self.collector().collect(document.tree(), host.selection())?;
        let target = if candidate.len() == 1 && self.config.auto_select_single_candidate {
            candidate.innermost()
        } else {
            let options = describe_candidates(document.tree(), &candidate);
            let Some(index) = host.choose_target(&options) else {
                return Ok(None);
            };
            candidate
                .expressions()
                .get(index)
                .copied()
                .ok_or(RefactorError::StaleSelection)?
        };

        self.transition(EngineState::Planning);
        let plan = self.planner().plan(document.tree(), target)?;

        self.transition(EngineState::Rewriting);
        let state = TreeRewriter::new(self.lang).rewrite(document, &plan)?;

        self.transition(EngineState::AwaitingRename);
        let session = RenameSession::start(self.lang, document, &state, &plan.name)?;
        let name = host.start_rename(document, session)?;
        info!(name = %name, "variable introduced");
        Ok(Some(name))
    }

    /// Extracts the innermost expression at `selection` without asking the
    /// user, then renames it if a name was given with [`named`](Self::named).
    ///
    /// A name that cannot be used is rejected before the document is touched.
    pub fn extract(&self, document: &mut Document, selection: Selection) -> Result<String> {
        if let Some(name) = &self.name {
            NodeFactory::new(self.lang).identifier(name)?;
        }
        let candidate = self.collector().collect(document.tree(), selection)?;
        let plan = self.planner().plan(document.tree(), candidate.innermost())?;
        let state = TreeRewriter::new(self.lang).rewrite(document, &plan)?;

        match &self.name {
            Some(name) if *name != plan.name => {
                let mut session = RenameSession::start(self.lang, document, &state, &plan.name)?;
                session.update(document, name)?;
                Ok(session.finish())
            }
            _ => Ok(plan.name),
        }
    }

    fn collector(&self) -> CandidateCollector<'a> {
        CandidateCollector::new(self.lang)
    }

    fn planner(&self) -> ExtractionPlanner<'a> {
        ExtractionPlanner::new(self.lang).with_placeholder(self.config.placeholder_name.clone())
    }

    fn transition(&mut self, next: EngineState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "engine state");
            self.state = next;
        }
    }
}

/// Chooser labels for every candidate.
pub fn describe_candidates(tree: &SyntaxTree, candidate: &ExtractionCandidate) -> Vec<String> {
    candidate.iter().map(|node| describe(tree, node)).collect()
}

fn describe(tree: &SyntaxTree, node: SyntaxNode) -> String {
    tree.text(node)
        .unwrap_or_else(|_| INVALID_EXPRESSION.to_string())
}

impl RefactoringOperation for IntroduceVariableHandler<'_> {
    fn name(&self) -> &'static str {
        "Introduce Variable"
    }

    fn validate(&self, ctx: &RefactoringContext) -> Result<ValidationResult> {
        ctx.validate()?;

        let factory = NodeFactory::new(self.lang);
        for name in std::iter::once(&self.config.placeholder_name).chain(&self.name) {
            if let Err(err) = factory.identifier(name) {
                return Ok(ValidationResult::invalid(err.to_string()));
            }
        }

        let candidate = match self.collector().collect(ctx.document.tree(), ctx.selection) {
            Ok(candidate) => candidate,
            Err(err) if err.is_user_facing() => {
                return Ok(ValidationResult::invalid(err.to_string()));
            }
            Err(err) => return Err(err),
        };
        if let Err(err) = self
            .planner()
            .find_anchor(ctx.document.tree(), candidate.innermost())
        {
            return Ok(ValidationResult::invalid(err.to_string()));
        }

        let mut result = ValidationResult::valid();
        if candidate.len() > 1 {
            result = result.with_warning(format!(
                "{} expressions are extractable here; using the innermost one",
                candidate.len()
            ));
        }
        Ok(result)
    }

    fn preview(&self, ctx: &RefactoringContext) -> Result<RefactoringPreview> {
        let mut document = ctx.document.clone();
        let name = self.extract(&mut document, ctx.selection)?;
        let original = ctx.document.text();
        let modified = document.text();

        let path = ctx
            .target_file()
            .unwrap_or_else(|| Path::new("<source>").to_path_buf());
        let diff = unified_diff(&original, &modified, &path, self.config.diff_context_lines);

        let mut preview =
            RefactoringPreview::new(format!("Extract expression into variable '{}'", name))
                .with_text(modified)
                .with_diff(diff);
        if let Some(file) = ctx.target_file() {
            preview.add_file(file);
        }
        Ok(preview)
    }

    fn apply(&self, ctx: &mut RefactoringContext) -> Result<RefactoringResult> {
        ctx.validate()?;
        // Rewrite and rename commit separately; only a fully renamed copy is kept.
        let mut document = ctx.document.clone();
        let name = self.extract(&mut document, ctx.selection)?;
        ctx.document = document;

        let mut result = RefactoringResult::success(format!("Introduced variable '{}'", name));
        if let Some(file) = ctx.target_file() {
            ctx.document.save()?;
            result = result.with_file(file);
        }
        Ok(result)
    }
}
