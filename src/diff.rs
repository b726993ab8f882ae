//! Diff generation for previewing document changes.

use similar::{ChangeTag, TextDiff};
use std::fmt;
use std::path::Path;

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Generates a unified diff with `context` lines around each hunk.
pub fn unified_diff(original: &str, modified: &str, path: &Path, context: usize) -> String {
    let diff = TextDiff::from_lines(original, modified);
    let a = format!("a/{}", path.display());
    let b = format!("b/{}", path.display());
    diff.unified_diff()
        .context_radius(context)
        .header(&a, &b)
        .to_string()
}

/// Colorized unified diff for terminal display.
pub fn colorized_diff(original: &str, modified: &str, path: &Path, context: usize) -> String {
    let diff = TextDiff::from_lines(original, modified);
    let mut output = format!(
        "{CYAN}--- a/{path}{RESET}\n{CYAN}+++ b/{path}{RESET}\n",
        path = path.display()
    );

    for hunk in diff.unified_diff().context_radius(context).iter_hunks() {
        output.push_str(&format!("{CYAN}{}{RESET}\n", hunk.header()));
        for change in hunk.iter_changes() {
            let (sign, color) = match change.tag() {
                ChangeTag::Delete => ("-", RED),
                ChangeTag::Insert => ("+", GREEN),
                ChangeTag::Equal => (" ", ""),
            };
            let line = change.value();
            let newline = if line.ends_with('\n') { "" } else { "\n" };
            if color.is_empty() {
                output.push_str(&format!("{sign}{line}{newline}"));
            } else {
                output.push_str(&format!("{color}{sign}{line}{RESET}{newline}"));
            }
        }
    }

    output
}

/// Line counts of a change.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiffSummary {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffSummary {
    /// Creates a summary from original and modified content.
    pub fn from_diff(original: &str, modified: &str) -> Self {
        let diff = TextDiff::from_lines(original, modified);
        let mut insertions = 0;
        let mut deletions = 0;

        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => insertions += 1,
                ChangeTag::Delete => deletions += 1,
                ChangeTag::Equal => {}
            }
        }

        Self {
            files_changed: usize::from(insertions > 0 || deletions > 0),
            insertions,
            deletions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files_changed == 0
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s) changed, {} insertions(+), {} deletions(-)",
            self.files_changed, self.insertions, self.deletions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BEFORE: &str = "fn main() {\n    let x = 1 + 2;\n}\n";
    const AFTER: &str = "fn main() {\n    let i = 1 + 2;\nlet x = i;\n}\n";

    #[test]
    fn test_unified_diff() {
        let diff = unified_diff(BEFORE, AFTER, Path::new("src/main.rs"), 3);

        assert!(diff.starts_with("--- a/src/main.rs\n+++ b/src/main.rs\n"));
        assert!(diff.contains("@@ -1,3 +1,4 @@"));
        assert!(diff.contains("-    let x = 1 + 2;\n"));
        assert!(diff.contains("+    let i = 1 + 2;\n"));
        assert!(diff.contains("+let x = i;\n"));
        assert!(diff.contains(" fn main() {\n"));
    }

    #[test]
    fn test_context_lines() {
        let diff = unified_diff(BEFORE, AFTER, Path::new("main.rs"), 0);
        assert!(!diff.contains(" fn main() {"));
    }

    #[test]
    fn test_colorized_diff() {
        let diff = colorized_diff(BEFORE, AFTER, Path::new("main.rs"), 3);
        assert!(diff.contains(&format!("{GREEN}+let x = i;\n{RESET}")));
        assert!(diff.contains(&format!("{RED}-    let x = 1 + 2;\n{RESET}")));
    }

    #[test]
    fn test_summary() {
        let summary = DiffSummary::from_diff(BEFORE, AFTER);
        assert_eq!(summary.insertions, 2);
        assert_eq!(summary.deletions, 1);
        assert_eq!(
            summary.to_string(),
            "1 file(s) changed, 2 insertions(+), 1 deletions(-)"
        );
        assert!(DiffSummary::from_diff(BEFORE, BEFORE).is_empty());
    }
}
