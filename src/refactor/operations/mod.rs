//! Non-interactive refactoring operations.
//!
//! An operation can be validated, previewed, and applied to a
//! [`RefactoringContext`] without a host UI. The introduce-variable handler
//! implements [`RefactoringOperation`], extracting the innermost expression at
//! the selection.
//!
//! ## Example
//!
//! ```rust,no_run
//! use introduce_variable::lang::Rust;
//! use introduce_variable::refactor::IntroduceVariableHandler;
//! use introduce_variable::refactor::operations::{RefactoringContext, RefactoringOperation};
//!
//! let mut ctx = RefactoringContext::from_source(&Rust, "fn main() { let x = 1 + 2; }")?
//!     .with_selection(0, 20, 0, 25);
//!
//! let op = IntroduceVariableHandler::new(&Rust).named("sum");
//!
//! let validation = op.validate(&ctx)?;
//! if validation.is_valid {
//!     println!("{}", op.preview(&ctx)?.diff);
//!     let result = op.apply(&mut ctx)?;
//!     println!("{}", result.description);
//! }
//! # Ok::<(), introduce_variable::error::RefactorError>(())
//! ```

mod context;

pub use context::{RefactoringContext, RefactoringPreview, RefactoringResult, ValidationResult};

use tracing::warn;

use crate::error::{RefactorError, Result};

/// Trait for refactoring operations.
///
/// All refactoring operations implement this trait, providing a consistent
/// interface for validation, preview, and application.
pub trait RefactoringOperation {
    /// Returns the name of this operation.
    fn name(&self) -> &'static str;

    /// Validates whether this operation can be applied.
    ///
    /// Problems with the selection are reported in the [`ValidationResult`];
    /// an `Err` means the context itself is unusable.
    fn validate(&self, ctx: &RefactoringContext) -> Result<ValidationResult>;

    /// Generates a preview of the changes without applying them.
    fn preview(&self, ctx: &RefactoringContext) -> Result<RefactoringPreview>;

    /// Applies the refactoring operation.
    ///
    /// This modifies the document and writes it back to disk if it was loaded
    /// from a file.
    fn apply(&self, ctx: &mut RefactoringContext) -> Result<RefactoringResult>;

    /// Validates and applies the operation in one step.
    fn execute(&self, ctx: &mut RefactoringContext) -> Result<RefactoringResult> {
        let validation = self.validate(ctx)?;
        if !validation.is_valid {
            return Err(RefactorError::InvalidConfig(validation.errors.join("; ")));
        }
        self.apply(ctx)
    }

    /// Returns a dry-run preview as a diff string.
    fn dry_run(&self, ctx: &RefactoringContext) -> Result<String> {
        let preview = self.preview(ctx)?;
        Ok(preview.diff)
    }
}

/// Builder for running refactoring operations.
#[derive(Debug, Default)]
pub struct RefactoringRunner {
    dry_run: bool,
}

impl RefactoringRunner {
    /// Create a new refactoring runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable dry-run mode (preview only).
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Run an operation on a context.
    pub fn run(
        &self,
        operation: &dyn RefactoringOperation,
        ctx: &mut RefactoringContext,
    ) -> Result<RefactoringResult> {
        let validation = operation.validate(ctx)?;

        if !validation.is_valid {
            return Err(RefactorError::InvalidConfig(validation.errors.join("; ")));
        }

        for warning in &validation.warnings {
            warn!(operation = operation.name(), "{}", warning);
        }

        if self.dry_run {
            let preview = operation.preview(ctx)?;
            Ok(RefactoringResult::success(format!(
                "[DRY RUN] Would apply: {}\n{}",
                operation.name(),
                preview.diff
            )))
        } else {
            operation.apply(ctx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Rust;
    use crate::refactor::IntroduceVariableHandler;

    const SOURCE: &str = "fn main() { let x = 1 + 2; }";

    #[test]
    fn test_runner_dry_run_leaves_document() {
        let mut ctx = RefactoringContext::from_source(&Rust, SOURCE)
            .unwrap()
            .with_selection(0, 20, 0, 25);
        let op = IntroduceVariableHandler::new(&Rust);

        let result = RefactoringRunner::new().dry_run().run(&op, &mut ctx).unwrap();

        assert!(result.description.starts_with("[DRY RUN] Would apply: Introduce Variable"));
        assert!(result.description.contains("+let x = i; }"));
        assert_eq!(ctx.document.text(), SOURCE);
    }

    #[test]
    fn test_runner_applies() {
        let mut ctx = RefactoringContext::from_source(&Rust, SOURCE)
            .unwrap()
            .with_selection(0, 20, 0, 25);
        let op = IntroduceVariableHandler::new(&Rust);

        let result = RefactoringRunner::new().run(&op, &mut ctx).unwrap();

        assert!(result.success);
        assert_eq!(ctx.document.text(), "fn main() { let i = 1 + 2;\nlet x = i; }");
    }

    #[test]
    fn test_execute_rejects_invalid_selection() {
        let mut ctx = RefactoringContext::from_source(&Rust, SOURCE)
            .unwrap()
            .with_selection(0, 11, 0, 12);
        let op = IntroduceVariableHandler::new(&Rust);

        let result = op.execute(&mut ctx);

        assert!(matches!(result, Err(RefactorError::InvalidConfig(msg)) if msg == "Select an expression"));
        assert_eq!(ctx.document.text(), SOURCE);
    }

    #[test]
    fn test_dry_run_returns_diff() {
        let ctx = RefactoringContext::from_source(&Rust, SOURCE)
            .unwrap()
            .with_selection(0, 20, 0, 25);
        let op = IntroduceVariableHandler::new(&Rust);

        let diff = op.dry_run(&ctx).unwrap();
        assert!(diff.contains("-fn main() { let x = 1 + 2; }"));
    }
}
