//! # Introduce Variable
//!
//! An "introduce variable" refactoring engine for Rust sources.
//!
//! Given a caret or a selection, the engine finds the expressions that can be
//! extracted, inserts `let <name> = <expression>;` before the enclosing
//! statement, replaces the expression with a reference to the new binding,
//! and hands the binding to an in-place rename.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use introduce_variable::prelude::*;
//!
//! let source = "fn main() { let x = 1 + 2; }";
//! let mut document = Document::parse(&Rust, source)?;
//!
//! let candidate = CandidateCollector::new(&Rust)
//!     .collect(document.tree(), Selection::Range(TextRange::new(20, 25)))?;
//! let plan = ExtractionPlanner::new(&Rust).plan(document.tree(), candidate.innermost())?;
//! let state = TreeRewriter::new(&Rust).rewrite(&mut document, &plan)?;
//!
//! let mut rename = RenameSession::start(&Rust, &document, &state, &plan.name)?;
//! rename.update(&mut document, "sum")?;
//! rename.finish();
//!
//! assert_eq!(document.text(), "fn main() { let sum = 1 + 2;\nlet x = sum; }");
//! # Ok::<(), introduce_variable::error::RefactorError>(())
//! ```
//!
//! ## Interactive Use
//!
//! An editor integration implements [`HostUi`](refactor::HostUi) and calls
//! [`IntroduceVariableHandler::invoke`](refactor::IntroduceVariableHandler::invoke),
//! which asks the host to choose among several candidates, reports errors, and
//! starts the rename session.
//!
//! ## Node Synthesis
//!
//! New syntax is produced by [`NodeFactory`](factory::NodeFactory), which parses
//! small template programs:
//!
//! ```rust,no_run
//! use introduce_variable::prelude::*;
//!
//! let tree = Rust.parse_tree("trait Shape { fn area(&self) -> f64; }")?;
//! let methods: Vec<_> = tree
//!     .descendants(tree.root())?
//!     .filter(|&n| tree.kind(n).ok() == Some("function_signature_item"))
//!     .collect();
//!
//! if let Some(skeleton) = NodeFactory::new(&Rust).create_impl_item(&tree, &methods) {
//!     println!("{}", skeleton.text());
//! }
//! # Ok::<(), introduce_variable::error::RefactorError>(())
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod factory;
pub mod lang;
pub mod logging;
pub mod refactor;
pub mod structure;
pub mod syntax;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::ExtractConfig;
    pub use crate::diff::{DiffSummary, colorized_diff, unified_diff};
    pub use crate::error::{RefactorError, Result};
    pub use crate::factory::NodeFactory;
    pub use crate::lang::{Language, Rust};
    pub use crate::refactor::operations::{
        RefactoringContext, RefactoringOperation, RefactoringPreview, RefactoringResult,
        RefactoringRunner, ValidationResult,
    };
    pub use crate::refactor::{
        CandidateCollector, EngineState, ExtractionCandidate, ExtractionPlanner, HostUi,
        IntroduceOutcome, IntroduceVariableHandler, PostRefactoringState, RefactoringPlan,
        RenameSession, Selection, TreeRewriter, describe_candidates,
        is_inplace_rename_available,
    };
    pub use crate::structure::{ItemKind, StructureItem, file_structure, structure_of};
    pub use crate::syntax::{
        Document, LineIndex, Position, SyntaxFragment, SyntaxNode, SyntaxTree, TextRange,
    };
}

pub use prelude::*;
