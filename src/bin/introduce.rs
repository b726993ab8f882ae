//! CLI for the introduce-variable refactoring.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use introduce_variable::logging::init_tracing;
use introduce_variable::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "introduce")]
#[command(author, version, about = "Extract Rust expressions into local variables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the expressions that can be extracted at a position
    Candidates {
        /// Source file
        file: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Extract an expression into a `let` binding
    Extract {
        /// Source file
        file: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Candidate to extract, as listed by `candidates` (default: innermost)
        #[arg(short, long)]
        pick: Option<usize>,

        /// Name for the new variable (default: the configured placeholder)
        #[arg(short, long)]
        name: Option<String>,

        /// YAML or JSON settings file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the diff instead of writing the file
        #[arg(long)]
        dry_run: bool,

        /// Colorize the diff
        #[arg(long)]
        color: bool,
    },

    /// Show the items of a file
    Structure {
        /// Source file
        file: PathBuf,

        /// Print JSON instead of an indented tree
        #[arg(long)]
        json: bool,
    },

    /// Print an implementation skeleton for a trait
    ImplSkeleton {
        /// Source file containing the trait
        file: PathBuf,

        /// Name of the trait
        #[arg(short, long = "trait")]
        trait_name: String,
    },
}

/// Caret or selection, as 0-based line and column.
#[derive(Args)]
struct SelectionArgs {
    /// Line of the caret or selection start
    #[arg(short, long)]
    line: u32,

    /// Column of the caret or selection start
    #[arg(short, long)]
    column: u32,

    /// Line of the selection end
    #[arg(long, requires = "end_column")]
    end_line: Option<u32>,

    /// Column of the selection end
    #[arg(long, requires = "end_line")]
    end_column: Option<u32>,
}

impl SelectionArgs {
    fn to_selection(&self, document: &Document) -> Selection {
        let index = LineIndex::new(&document.text());
        let start = index.offset(Position::new(self.line, self.column));
        match (self.end_line, self.end_column) {
            (Some(line), Some(column)) => {
                let end = index.offset(Position::new(line, column));
                Selection::from_range(TextRange::new(start, end))
            }
            _ => Selection::Caret(start),
        }
    }
}

/// Plays the editor: answers the chooser from `--pick` and renames from `--name`.
struct CliHost {
    selection: Selection,
    pick: Option<usize>,
    name: Option<String>,
}

impl HostUi for CliHost {
    fn selection(&self) -> Selection {
        self.selection
    }

    fn choose_target(&mut self, options: &[String]) -> Option<usize> {
        let pick = self.pick.unwrap_or(0);
        (pick < options.len()).then_some(pick)
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("Cannot perform refactoring: {}", message);
    }

    fn start_rename(
        &mut self,
        document: &mut Document,
        mut session: RenameSession<'_>,
    ) -> introduce_variable::error::Result<String> {
        if let Some(name) = &self.name {
            session.update(document, name)?;
        }
        Ok(session.finish())
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Candidates { file, selection } => cmd_candidates(file, selection),
        Commands::Extract {
            file,
            selection,
            pick,
            name,
            config,
            dry_run,
            color,
        } => cmd_extract(file, selection, pick, name, config, dry_run, color),
        Commands::Structure { file, json } => cmd_structure(file, json),
        Commands::ImplSkeleton { file, trait_name } => cmd_impl_skeleton(file, trait_name),
    }
}

fn open(path: &Path) -> Result<Document> {
    Document::open(&Rust, path).with_context(|| format!("Failed to open {}", path.display()))
}

fn cmd_candidates(file: PathBuf, selection: SelectionArgs) -> Result<()> {
    let document = open(&file)?;
    let candidate = CandidateCollector::new(&Rust)
        .collect(document.tree(), selection.to_selection(&document))
        .context("No extractable expression")?;

    let index = LineIndex::new(&document.text());
    let labels = describe_candidates(document.tree(), &candidate);
    for (number, (node, text)) in candidate.iter().zip(&labels).enumerate() {
        let start = index.position(document.tree().range(node)?.start);
        println!("{}: {}:{} {}", number, start.line, start.character, text);
    }
    Ok(())
}

fn cmd_extract(
    file: PathBuf,
    selection: SelectionArgs,
    pick: Option<usize>,
    name: Option<String>,
    config: Option<PathBuf>,
    dry_run: bool,
    color: bool,
) -> Result<()> {
    let config = match config {
        Some(path) => ExtractConfig::load(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ExtractConfig::default(),
    };
    let context_lines = config.diff_context_lines;

    let mut document = open(&file)?;
    let original = document.text();
    let mut host = CliHost {
        selection: selection.to_selection(&document),
        pick,
        name,
    };

    // The chooser is answered by `--pick`, so it is only consulted when one was given.
    let config = if pick.is_some() {
        config.always_choose()
    } else {
        config
    };
    let mut handler = IntroduceVariableHandler::with_config(&Rust, config);

    match handler.invoke(&mut document, &mut host) {
        IntroduceOutcome::Introduced { name } => {
            let modified = document.text();
            if dry_run {
                let diff = if color {
                    colorized_diff(&original, &modified, &file, context_lines)
                } else {
                    unified_diff(&original, &modified, &file, context_lines)
                };
                print!("{}", diff);
            } else {
                document.save()?;
                println!("Introduced variable '{}'", name);
            }
            println!("{}", DiffSummary::from_diff(&original, &modified));
            Ok(())
        }
        IntroduceOutcome::Cancelled => {
            println!("Cancelled");
            Ok(())
        }
        // Already reported through `show_error`.
        IntroduceOutcome::Failed(_) => std::process::exit(1),
    }
}

fn cmd_structure(file: PathBuf, json: bool) -> Result<()> {
    let document = open(&file)?;
    let items = file_structure(document.tree())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        print_items(&items, 0);
    }
    Ok(())
}

fn print_items(items: &[StructureItem], depth: usize) {
    for item in items {
        println!("{}{}", "  ".repeat(depth), item);
        print_items(&item.children, depth + 1);
    }
}

fn cmd_impl_skeleton(file: PathBuf, trait_name: String) -> Result<()> {
    let document = open(&file)?;
    let tree = document.tree();

    let Some(trait_item) = tree.descendants(tree.root())?.find(|&node| {
        matches!(tree.kind(node), Ok("trait_item"))
            && tree
                .child_by_field(node, "name")
                .ok()
                .flatten()
                .and_then(|name| tree.text(name).ok())
                .is_some_and(|name| name == trait_name)
    }) else {
        bail!("Trait '{}' not found in {}", trait_name, file.display());
    };

    let methods: Vec<_> = match tree.child_by_field(trait_item, "body")? {
        Some(body) => tree
            .children(body)?
            .into_iter()
            .filter(|&node| matches!(tree.kind(node), Ok("function_signature_item")))
            .collect(),
        None => Vec::new(),
    };

    let skeleton = NodeFactory::new(&Rust)
        .create_impl_item(tree, &methods)
        .with_context(|| format!("Trait '{}' has no methods to implement", trait_name))?;
    println!("{}", skeleton.text());
    Ok(())
}
