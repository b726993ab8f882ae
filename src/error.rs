//! Error types for the introduce-variable engine.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for refactoring operations.
///
/// The first group of variants is the refactoring taxonomy: every one of them is
/// recoverable and is reported to the user as a single message. The remaining
/// variants describe failures of the environment (files, configuration, parser).
#[derive(Error, Debug)]
pub enum RefactorError {
    #[error("Select an expression")]
    NoExpressionFound,

    #[error("Cannot introduce a variable here: the expression is not inside a block")]
    NoEnclosingBlock,

    #[error("Cannot introduce a variable here: no statement to insert the binding before")]
    NoAnchor,

    #[error("The selected expression is no longer valid")]
    StaleSelection,

    #[error("Cannot create {what}")]
    SynthesisFailed { what: String },

    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("Document is read-only: {0}")]
    ReadOnly(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tree-sitter parse error for {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Language not supported: {0}")]
    UnsupportedLanguage(String),

    #[error("Transform failed: {message}")]
    TransformFailed { message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RefactorError {
    /// Shorthand for a [`RefactorError::SynthesisFailed`] naming what could not be built.
    pub fn synthesis(what: impl Into<String>) -> Self {
        RefactorError::SynthesisFailed { what: what.into() }
    }

    /// Returns true for errors caused by the user's selection or input rather
    /// than by the environment.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            RefactorError::NoExpressionFound
                | RefactorError::NoEnclosingBlock
                | RefactorError::NoAnchor
                | RefactorError::StaleSelection
                | RefactorError::SynthesisFailed { .. }
                | RefactorError::InvalidIdentifier(_)
                | RefactorError::ReadOnly(_)
        )
    }
}

/// A specialized Result type for refactoring operations.
pub type Result<T> = std::result::Result<T, RefactorError>;
