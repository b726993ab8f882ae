//! Structure view: the items of a module as a presentation tree.

use serde::Serialize;
use std::fmt;

use crate::error::{RefactorError, Result};
use crate::syntax::{SyntaxNode, SyntaxTree, TextRange};

/// The kinds of items shown in the structure view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Constant,
    Enum,
    Function,
    Impl,
    /// `mod name;`
    ModDecl,
    /// `mod name { ... }`
    Module,
    Static,
    Struct,
    Trait,
    TypeAlias,
}

impl ItemKind {
    /// Classifies an item node. `None` for anything the view does not show.
    pub fn of(tree: &SyntaxTree, node: SyntaxNode) -> Result<Option<Self>> {
        let kind = match tree.kind(node)? {
            "const_item" => ItemKind::Constant,
            "enum_item" => ItemKind::Enum,
            "function_item" | "function_signature_item" => ItemKind::Function,
            "impl_item" => ItemKind::Impl,
            "mod_item" if tree.child_by_field(node, "body")?.is_some() => ItemKind::Module,
            "mod_item" => ItemKind::ModDecl,
            "static_item" => ItemKind::Static,
            "struct_item" => ItemKind::Struct,
            "trait_item" => ItemKind::Trait,
            "type_item" => ItemKind::TypeAlias,
            _ => return Ok(None),
        };
        Ok(Some(kind))
    }

    /// The keyword introducing the item.
    pub fn keyword(self) -> &'static str {
        match self {
            ItemKind::Constant => "const",
            ItemKind::Enum => "enum",
            ItemKind::Function => "fn",
            ItemKind::Impl => "impl",
            ItemKind::ModDecl | ItemKind::Module => "mod",
            ItemKind::Static => "static",
            ItemKind::Struct => "struct",
            ItemKind::Trait => "trait",
            ItemKind::TypeAlias => "type",
        }
    }

    fn has_members(self) -> bool {
        matches!(self, ItemKind::Module | ItemKind::Impl | ItemKind::Trait)
    }
}

/// One entry of the structure view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructureItem {
    pub kind: ItemKind,
    pub name: Option<String>,
    pub range: TextRange,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StructureItem>,
}

impl fmt::Display for StructureItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.kind.keyword(),
            self.name.as_deref().unwrap_or("<anonymous>")
        )
    }
}

/// The items of `container`: a whole file, an inline module, an impl or a trait.
pub fn structure_of(tree: &SyntaxTree, container: SyntaxNode) -> Result<Vec<StructureItem>> {
    let items = match tree.kind(container)? {
        "source_file" => container,
        "mod_item" | "impl_item" | "trait_item" => match tree.child_by_field(container, "body")? {
            Some(body) => body,
            None => return Ok(Vec::new()),
        },
        other => {
            return Err(RefactorError::TransformFailed {
                message: format!("'{other}' has no structure"),
            });
        }
    };

    let mut result = Vec::new();
    for child in tree.children(items)? {
        let Some(kind) = ItemKind::of(tree, child)? else {
            continue;
        };
        let children = if kind.has_members() {
            structure_of(tree, child)?
        } else {
            Vec::new()
        };
        result.push(StructureItem {
            kind,
            name: item_name(tree, child, kind)?,
            range: tree.range(child)?,
            children,
        });
    }
    Ok(result)
}

/// The structure of a whole file.
pub fn file_structure(tree: &SyntaxTree) -> Result<Vec<StructureItem>> {
    structure_of(tree, tree.root())
}

fn item_name(tree: &SyntaxTree, node: SyntaxNode, kind: ItemKind) -> Result<Option<String>> {
    if kind == ItemKind::Impl {
        let Some(ty) = tree.child_by_field(node, "type")? else {
            return Ok(None);
        };
        let ty = tree.text(ty)?;
        return Ok(Some(match tree.child_by_field(node, "trait")? {
            Some(tr) => format!("{} for {}", tree.text(tr)?, ty),
            None => ty,
        }));
    }
    tree.child_by_field(node, "name")?
        .map(|name| tree.text(name))
        .transpose()
}
