//! The introduce-variable refactoring pipeline.
//!
//! The stages run in order and hand plain data to each other:
//!
//! 1. [`CandidateCollector`] resolves a [`Selection`] to the expressions that
//!    can be extracted, innermost first.
//! 2. [`ExtractionPlanner`] turns the chosen expression into a
//!    [`RefactoringPlan`].
//! 3. [`TreeRewriter`] applies the plan in one document transaction and returns
//!    a [`PostRefactoringState`].
//! 4. [`RenameSession`] renames the new binding and its references together.
//!
//! [`IntroduceVariableHandler`] strings the stages together behind a
//! [`HostUi`].

mod collector;
mod introduce;
pub mod operations;
mod planner;
mod rename;
mod rewriter;

pub use collector::{CandidateCollector, ExtractionCandidate, Selection};
pub use introduce::{
    EngineState, HostUi, INVALID_EXPRESSION, IntroduceOutcome, IntroduceVariableHandler,
    describe_candidates,
};
pub use planner::{DEFAULT_PLACEHOLDER, ExtractionPlanner, RefactoringPlan};
pub use rename::{RenameSession, is_inplace_rename_available};
pub use rewriter::{PostRefactoringState, TreeRewriter};
