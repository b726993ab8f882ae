//! Refactoring context for operations.

use std::path::{Path, PathBuf};

use crate::error::{RefactorError, Result};
use crate::lang::Language;
use crate::refactor::Selection;
use crate::syntax::{Document, LineIndex, Position, TextRange};

/// Context for a refactoring operation: the document and what is selected in it.
#[derive(Debug, Clone)]
pub struct RefactoringContext {
    /// The document being refactored.
    pub document: Document,
    /// The user's selection or caret.
    pub selection: Selection,
}

impl RefactoringContext {
    /// Create a new context with the caret at the start of the document.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            selection: Selection::Caret(0),
        }
    }

    /// Create a context for in-memory source.
    pub fn from_source(lang: &dyn Language, source: &str) -> Result<Self> {
        Ok(Self::new(Document::parse(lang, source)?))
    }

    /// Load the target file.
    pub fn open(lang: &dyn Language, path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Document::open(lang, path)?))
    }

    /// Set the selection.
    pub fn with_selection_of(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Set a byte range selection. Empty ranges become a caret.
    pub fn with_range(self, range: TextRange) -> Self {
        self.with_selection_of(Selection::from_range(range))
    }

    /// Set the selection from line/column positions.
    pub fn with_selection(
        self,
        start_line: u32,
        start_col: u32,
        end_line: u32,
        end_col: u32,
    ) -> Self {
        let index = LineIndex::new(&self.document.text());
        let start = index.offset(Position::new(start_line, start_col));
        let end = index.offset(Position::new(end_line, end_col));
        self.with_range(TextRange::new(start, end))
    }

    /// Place the caret at a line/column position.
    pub fn with_caret(self, line: u32, col: u32) -> Self {
        self.with_selection(line, col, line, col)
    }

    /// The target file, if the document was loaded from disk.
    pub fn target_file(&self) -> Option<PathBuf> {
        self.document.path().map(Path::to_path_buf)
    }

    /// Get the selected text. Empty for a caret.
    pub fn selected_text(&self) -> String {
        match self.selection {
            Selection::Range(range) => self
                .document
                .text()
                .get(range.start..range.end)
                .unwrap_or("")
                .to_string(),
            Selection::Caret(_) => String::new(),
        }
    }

    /// Validate the context before an operation.
    pub fn validate(&self) -> Result<()> {
        if self.document.text().is_empty() {
            return Err(RefactorError::InvalidConfig(
                "Source code is empty".to_string(),
            ));
        }

        if self.document.is_read_only() {
            return Err(RefactorError::ReadOnly(
                self.target_file().unwrap_or_default(),
            ));
        }

        Ok(())
    }
}

/// Result of validating a refactoring operation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the operation is valid.
    pub is_valid: bool,
    /// Error messages if invalid.
    pub errors: Vec<String>,
    /// Warning messages.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a valid result.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Create an invalid result with an error.
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            errors: vec![error.into()],
            warnings: Vec::new(),
        }
    }

    /// Add a warning.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Preview of a refactoring operation.
#[derive(Debug, Clone)]
pub struct RefactoringPreview {
    /// Description of the operation.
    pub description: String,
    /// Files that will be modified.
    pub affected_files: Vec<PathBuf>,
    /// The document text after the operation.
    pub new_text: String,
    /// Diff preview.
    pub diff: String,
}

impl RefactoringPreview {
    /// Create a new preview.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            affected_files: Vec::new(),
            new_text: String::new(),
            diff: String::new(),
        }
    }

    /// Add an affected file.
    pub fn add_file(&mut self, file: PathBuf) {
        if !self.affected_files.contains(&file) {
            self.affected_files.push(file);
        }
    }

    /// Set the resulting text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.new_text = text.into();
        self
    }

    /// Set the diff.
    pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
        self.diff = diff.into();
        self
    }
}

/// Result of applying a refactoring operation.
#[derive(Debug, Clone)]
pub struct RefactoringResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Description of what was done.
    pub description: String,
    /// Files that were modified.
    pub modified_files: Vec<PathBuf>,
}

impl RefactoringResult {
    /// Create a successful result.
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            success: true,
            description: description.into(),
            modified_files: Vec::new(),
        }
    }

    /// Add a modified file.
    pub fn with_file(mut self, file: PathBuf) -> Self {
        if !self.modified_files.contains(&file) {
            self.modified_files.push(file);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Rust;

    #[test]
    fn test_context_creation() {
        let ctx = RefactoringContext::from_source(&Rust, "fn main() {\n    let x = 1 + 2;\n}\n")
            .unwrap()
            .with_selection(1, 12, 1, 17);

        assert_eq!(ctx.selected_text(), "1 + 2");
        assert_eq!(ctx.selection, Selection::Range(TextRange::new(24, 29)));
        assert_eq!(ctx.target_file(), None);
    }

    #[test]
    fn test_caret_position() {
        let ctx = RefactoringContext::from_source(&Rust, "fn main() {\n    f(1);\n}\n")
            .unwrap()
            .with_caret(1, 7);

        assert_eq!(ctx.selection, Selection::Caret(19));
        assert_eq!(ctx.selected_text(), "");
    }

    #[test]
    fn test_validate_empty_source() {
        let ctx = RefactoringContext::from_source(&Rust, "").unwrap();
        assert!(matches!(ctx.validate(), Err(RefactorError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_read_only() {
        let doc = Document::parse(&Rust, "fn main() {}").unwrap().read_only();
        let ctx = RefactoringContext::new(doc);
        assert!(matches!(ctx.validate(), Err(RefactorError::ReadOnly(_))));
    }

    #[test]
    fn test_validation_result() {
        let result = ValidationResult::valid().with_warning("shadowing");
        assert!(result.is_valid);
        assert_eq!(result.warnings, vec!["shadowing"]);

        let result = ValidationResult::invalid("no expression");
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["no expression"]);
    }

    #[test]
    fn test_preview_dedups_files() {
        let mut preview = RefactoringPreview::new("Introduce variable");
        preview.add_file(PathBuf::from("a.rs"));
        preview.add_file(PathBuf::from("a.rs"));
        assert_eq!(preview.affected_files.len(), 1);
    }
}
