//! Node synthesis.
//!
//! New syntax is never assembled node by node. Each constructor renders a
//! small, always-parseable wrapper program around the requested snippet, parses
//! it, and extracts the first descendant of the wanted shape. A wrapper that
//! does not parse cleanly yields `None`, which callers treat as "cannot build
//! this content".

use crate::error::{RefactorError, Result};
use crate::lang::Language;
use crate::syntax::{SyntaxFragment, SyntaxNode, SyntaxTree, TEXT, WHITESPACE};

/// Builds new syntax fragments for a language.
pub struct NodeFactory<'a> {
    lang: &'a dyn Language,
}

impl<'a> NodeFactory<'a> {
    pub fn new(lang: &'a dyn Language) -> Self {
        Self { lang }
    }

    pub fn create_expression(&self, expression: &str) -> Option<SyntaxFragment> {
        self.create_from_text(&format!("fn main() {{ {expression}; }}"), |tree, node| {
            self.lang.is_expression(tree, node)
        })
    }

    /// `statement` must carry its own terminator, e.g. `let a = 1;`.
    pub fn create_statement(&self, statement: &str) -> Option<SyntaxFragment> {
        self.create_from_text(&format!("fn main() {{ {statement} 92; }}"), |tree, node| {
            self.lang.is_statement(tree, node)
        })
    }

    /// `let <name> = <initializer>;`
    pub fn create_var_declaration(&self, name: &str, initializer: &str) -> Option<SyntaxFragment> {
        self.create_of_kind(
            &format!("fn main() {{ let {name} = {initializer}; }}"),
            "let_declaration",
        )
    }

    pub fn create_mod_decl_item(&self, mod_name: &str) -> Option<SyntaxFragment> {
        self.create_of_kind(&format!("mod {mod_name};"), "mod_item")
    }

    pub fn create_outer_attr(&self, attr_contents: &str) -> Option<SyntaxFragment> {
        self.create_of_kind(
            &format!("#[{attr_contents}] struct Dummy;"),
            "attribute_item",
        )
    }

    pub fn create_use_item(&self, path: &str) -> Option<SyntaxFragment> {
        self.create_of_kind(&format!("use {path};"), "use_declaration")
    }

    /// A struct literal body initializing every field with `()`.
    pub fn create_struct_expr_body<S: AsRef<str>>(
        &self,
        field_names: &[S],
    ) -> Option<SyntaxFragment> {
        let fields = field_names
            .iter()
            .map(|name| format!("{}: (),", name.as_ref()))
            .collect::<Vec<_>>()
            .join("\n");
        self.create_of_kind(
            &format!("fn main() {{ S {{ {fields} }}; }}"),
            "field_initializer_list",
        )
    }

    pub fn create_block_expr(&self, body: &str) -> Option<SyntaxFragment> {
        self.create_from_text(&format!("fn main() {{ {{ {body} }} }}"), |tree, node| {
            self.lang.is_block(tree, node)
                && tree
                    .parent(node)
                    .ok()
                    .flatten()
                    .is_some_and(|parent| !matches!(tree.kind(parent), Ok("function_item")))
        })
    }

    /// An `impl T for S` skeleton with one stub per trait method.
    ///
    /// Signatures are rebuilt from their parts instead of copied from the
    /// trait: anonymous parameters (`fn f(u8);`) are not valid in a method with
    /// a body, so they are rendered as `_: u8`.
    pub fn create_impl_item(
        &self,
        tree: &SyntaxTree,
        trait_methods: &[SyntaxNode],
    ) -> Option<SyntaxFragment> {
        if trait_methods.is_empty() {
            return None;
        }
        let methods = trait_methods
            .iter()
            .filter_map(|&method| signature_text(tree, method))
            .map(|signature| format!(" {signature} {{\nunimplemented!()\n}}"))
            .collect::<Vec<_>>()
            .join("\n\n");
        self.create_of_kind(&format!("impl T for S {{ {methods} }}"), "impl_item")
    }

    pub fn create_identifier(&self, name: &str) -> Option<SyntaxFragment> {
        self.create_from_text(&format!("mod {name};"), |tree, node| {
            matches!(tree.field(node), Ok(Some("name")))
        })
    }

    /// Like [`create_identifier`](Self::create_identifier), but fails unless
    /// `name` is a single identifier token.
    pub fn identifier(&self, name: &str) -> Result<SyntaxFragment> {
        self.create_identifier(name)
            .filter(|ident| ident.text() == name)
            .ok_or_else(|| RefactorError::InvalidIdentifier(name.to_string()))
    }

    /// A where clause holding the bounds of the bounded generic parameters,
    /// lifetimes first.
    pub fn create_where_clause(
        &self,
        tree: &SyntaxTree,
        generic_params: &[SyntaxNode],
    ) -> Option<SyntaxFragment> {
        let mut lifetimes = Vec::new();
        let mut types = Vec::new();
        for &param in generic_params {
            match where_predicate(tree, param) {
                Some((true, predicate)) => lifetimes.push(predicate),
                Some((false, predicate)) => types.push(predicate),
                None => {}
            }
        }
        if lifetimes.is_empty() && types.is_empty() {
            return None;
        }
        lifetimes.extend(types);
        self.create_of_kind(
            &format!("fn main() where {} {{}}", lifetimes.join(", ")),
            "where_clause",
        )
    }

    /// A line break followed by `indent`.
    pub fn new_line(&self, indent: &str) -> SyntaxFragment {
        SyntaxFragment::whitespace(&format!("\n{indent}"))
    }

    fn create_of_kind(&self, code: &str, kind: &str) -> Option<SyntaxFragment> {
        self.create_from_text(code, |tree, node| matches!(tree.kind(node), Ok(k) if k == kind))
    }

    fn create_from_text(
        &self,
        code: &str,
        pred: impl Fn(&SyntaxTree, SyntaxNode) -> bool,
    ) -> Option<SyntaxFragment> {
        let tree = self.lang.parse_fragment(code)?;
        let node = tree
            .descendants(tree.root())
            .ok()?
            .skip(1)
            .find(|&node| pred(&tree, node))?;
        Some(SyntaxFragment::new(tree, node))
    }
}

fn field_text(tree: &SyntaxTree, node: SyntaxNode, field: &str) -> Option<String> {
    let child = tree.child_by_field(node, field).ok()??;
    tree.text(child).ok()
}

/// `fn name<generics>(params) -> ret where ...` of a trait method.
fn signature_text(tree: &SyntaxTree, method: SyntaxNode) -> Option<String> {
    let name = field_text(tree, method, "name")?;
    let generics = field_text(tree, method, "type_parameters").unwrap_or_default();
    let parameters = tree.child_by_field(method, "parameters").ok()??;

    let mut arguments = Vec::new();
    for param in tree.children(parameters).ok()? {
        match tree.kind(param).ok()? {
            "self_parameter" | "variadic_parameter" => arguments.push(tree.text(param).ok()?),
            "parameter" => {
                let pat = field_text(tree, param, "pattern").unwrap_or_else(|| "_".to_string());
                let ty = field_text(tree, param, "type").unwrap_or_else(|| "()".to_string());
                arguments.push(format!("{pat}: {ty}"));
            }
            "_" => arguments.push("_: ()".to_string()),
            "attribute_item" | "line_comment" | "block_comment" | WHITESPACE | TEXT => {}
            _ if tree.is_named(param).ok()? => {
                arguments.push(format!("_: {}", tree.text(param).ok()?));
            }
            _ => {}
        }
    }

    let ret = field_text(tree, method, "return_type")
        .map(|ty| format!(" -> {ty}"))
        .unwrap_or_default();
    let where_clause = tree
        .child_of_kind(method, "where_clause")
        .ok()
        .flatten()
        .and_then(|clause| tree.text(clause).ok())
        .map(|clause| format!(" {clause}"))
        .unwrap_or_default();

    Some(format!(
        "fn {name}{generics}({}){ret}{where_clause}",
        arguments.join(", ")
    ))
}

/// `(is_lifetime, "name: bounds")` for a bounded generic parameter.
fn where_predicate(tree: &SyntaxTree, param: SyntaxNode) -> Option<(bool, String)> {
    let bounds = tree.child_by_field(param, "bounds").ok()??;
    let name = match tree.child_by_field(param, "name").ok()? {
        Some(name) => name,
        None => tree.child_by_field(param, "left").ok()??,
    };
    let is_lifetime = tree.kind(name).ok()? == "lifetime";
    Some((
        is_lifetime,
        format!("{}{}", tree.text(name).ok()?, tree.text(bounds).ok()?),
    ))
}
