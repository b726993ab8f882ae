//! Documents and scoped mutation transactions.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::tree::SyntaxTree;
use crate::error::{RefactorError, Result};
use crate::lang::Language;

/// The parsed contents of one source file.
#[derive(Debug, Clone)]
pub struct Document {
    path: Option<PathBuf>,
    tree: SyntaxTree,
    read_only: bool,
    revision: u64,
}

impl Document {
    /// Parses in-memory source.
    pub fn parse(lang: &dyn Language, source: &str) -> Result<Self> {
        Ok(Self {
            path: None,
            tree: lang.parse_tree(source)?,
            read_only: false,
            revision: 0,
        })
    }

    /// Loads and parses a file. Files the process cannot write are opened read-only.
    pub fn open(lang: &dyn Language, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !lang.matches_extension(ext) {
            return Err(RefactorError::UnsupportedLanguage(
                if ext.is_empty() { "unknown" } else { ext }.to_string(),
            ));
        }

        let source = std::fs::read_to_string(path)?;
        let read_only = std::fs::metadata(path)?.permissions().readonly();
        debug!(path = %path.display(), read_only, "opened document");

        Ok(Self {
            path: Some(path.to_path_buf()),
            tree: lang.parse_tree(&source)?,
            read_only,
            revision: 0,
        })
    }

    /// Marks the document read-only.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Number of committed transactions.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// The current source text.
    pub fn text(&self) -> String {
        self.tree.text(self.tree.root()).unwrap_or_default()
    }

    /// Runs `f` against the tree with commit-or-discard semantics.
    ///
    /// If `f` returns an error or panics, the tree is restored to its state
    /// before the call; handles issued before the transaction are valid again.
    pub fn transaction<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut SyntaxTree) -> Result<T>,
    ) -> Result<T> {
        let _span = tracing::debug_span!("transaction", name).entered();
        let snapshot = self.tree.clone();

        match panic::catch_unwind(AssertUnwindSafe(|| f(&mut self.tree))) {
            Ok(Ok(value)) => {
                self.revision += 1;
                debug!(revision = self.revision, "committed");
                Ok(value)
            }
            Ok(Err(err)) => {
                self.tree = snapshot;
                warn!(error = %err, "rolled back");
                Err(err)
            }
            Err(payload) => {
                self.tree = snapshot;
                warn!("rolled back after panic");
                panic::resume_unwind(payload)
            }
        }
    }

    /// Writes the current text back to the file the document was opened from.
    pub fn save(&self) -> Result<()> {
        let path = self.path.as_ref().ok_or_else(|| {
            RefactorError::InvalidConfig("Document has no file path".to_string())
        })?;
        if self.read_only {
            return Err(RefactorError::ReadOnly(path.clone()));
        }
        std::fs::write(path, self.text())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Rust;
    use crate::syntax::SyntaxFragment;

    #[test]
    fn test_commit_bumps_revision() {
        let mut doc = Document::parse(&Rust, "fn main() { let x = 1; }").unwrap();
        let root = doc.tree().root();
        let decl = doc
            .tree()
            .descendants(root)
            .unwrap()
            .find(|&n| doc.tree().kind(n).unwrap() == "let_declaration")
            .unwrap();

        doc.transaction("newline", |tree| {
            tree.insert_before(decl, &SyntaxFragment::whitespace("\n"))
        })
        .unwrap();

        assert_eq!(doc.revision(), 1);
        assert_eq!(doc.text(), "fn main() { \nlet x = 1; }");
    }

    #[test]
    fn test_error_rolls_back() {
        let mut doc = Document::parse(&Rust, "fn main() { let x = 1; }").unwrap();
        let decl = doc
            .tree()
            .descendants(doc.tree().root())
            .unwrap()
            .find(|&n| doc.tree().kind(n).unwrap() == "let_declaration")
            .unwrap();

        let result: Result<()> = doc.transaction("partial", |tree| {
            tree.insert_before(decl, &SyntaxFragment::whitespace("\n"))?;
            Err(RefactorError::synthesis("a binding"))
        });

        assert!(result.is_err());
        assert_eq!(doc.revision(), 0);
        assert_eq!(doc.text(), "fn main() { let x = 1; }");
        assert!(doc.tree().is_valid(decl));
    }

    #[test]
    fn test_panic_rolls_back() {
        let mut doc = Document::parse(&Rust, "fn main() { let x = 1; }").unwrap();
        let decl = doc
            .tree()
            .descendants(doc.tree().root())
            .unwrap()
            .find(|&n| doc.tree().kind(n).unwrap() == "let_declaration")
            .unwrap();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _: Result<()> = doc.transaction("panicking", |tree| {
                tree.insert_before(decl, &SyntaxFragment::whitespace("\n"))?;
                panic!("boom");
            });
        }));

        assert!(outcome.is_err());
        assert_eq!(doc.text(), "fn main() { let x = 1; }");
    }

    #[test]
    fn test_open_and_save() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("main.rs");
        std::fs::write(&path, "fn main() {}\n").unwrap();

        let doc = Document::open(&Rust, &path).unwrap();
        assert_eq!(doc.text(), "fn main() {}\n");
        assert_eq!(doc.path(), Some(path.as_path()));
        doc.save().unwrap();
    }

    #[test]
    fn test_open_rejects_other_languages() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("main.py");
        std::fs::write(&path, "print(1)\n").unwrap();

        let result = Document::open(&Rust, &path);
        assert!(matches!(result, Err(RefactorError::UnsupportedLanguage(_))));
    }

    #[test]
    fn test_save_read_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("lib.rs");
        std::fs::write(&path, "fn f() {}\n").unwrap();

        let doc = Document::open(&Rust, &path).unwrap().read_only();
        assert!(matches!(doc.save(), Err(RefactorError::ReadOnly(_))));
    }
}
