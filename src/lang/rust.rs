//! Rust language support.

use super::Language;
use tree_sitter::Language as TsLanguage;

/// Rust programming language.
pub struct Rust;

const EXPRESSION_KINDS: &[&str] = &[
    "array_expression",
    "assignment_expression",
    "async_block",
    "await_expression",
    "binary_expression",
    "boolean_literal",
    "break_expression",
    "call_expression",
    "char_literal",
    "closure_expression",
    "compound_assignment_expression",
    "const_block",
    "continue_expression",
    "field_expression",
    "float_literal",
    "for_expression",
    "gen_block",
    "generic_function",
    "identifier",
    "if_expression",
    "index_expression",
    "integer_literal",
    "loop_expression",
    "macro_invocation",
    "match_expression",
    "parenthesized_expression",
    "range_expression",
    "raw_string_literal",
    "reference_expression",
    "return_expression",
    "scoped_identifier",
    "self",
    "string_literal",
    "struct_expression",
    "try_block",
    "try_expression",
    "tuple_expression",
    "type_cast_expression",
    "unary_expression",
    "unit_expression",
    "unsafe_block",
    "while_expression",
    "yield_expression",
];

const STATEMENT_KINDS: &[&str] = &["expression_statement", "let_declaration"];

/// Parents whose expression-kinded children are patterns, names or paths.
const NON_EXPRESSION_PARENTS: &[&str] = &[
    "attribute",
    "captured_pattern",
    "closure_parameters",
    "field_pattern",
    "function_item",
    "function_signature_item",
    "generic_function",
    "macro_definition",
    "match_pattern",
    "mod_item",
    "mut_pattern",
    "or_pattern",
    "parameter",
    "range_pattern",
    "ref_pattern",
    "reference_pattern",
    "scoped_identifier",
    "scoped_type_identifier",
    "scoped_use_list",
    "self_parameter",
    "shorthand_field_initializer",
    "slice_pattern",
    "struct_pattern",
    "token_tree",
    "tuple_pattern",
    "tuple_struct_pattern",
    "use_as_clause",
    "use_declaration",
    "use_list",
    "use_wildcard",
    "visibility_modifier",
];

const NON_EXPRESSION_FIELDS: &[&str] = &[
    "alias", "bounds", "label", "macro", "name", "path", "pattern", "return_type", "trait",
    "type",
];

/// Pattern kinds under which any identifier binds a name.
const BINDING_PARENTS: &[&str] = &[
    "captured_pattern",
    "closure_parameters",
    "field_pattern",
    "match_pattern",
    "mut_pattern",
    "or_pattern",
    "ref_pattern",
    "reference_pattern",
    "slice_pattern",
    "tuple_pattern",
];

impl Language for Rust {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn extensions(&self) -> &[&'static str] {
        &["rs"]
    }

    fn grammar(&self) -> TsLanguage {
        tree_sitter_rust::LANGUAGE.into()
    }

    fn is_expression_kind(&self, kind: &str) -> bool {
        EXPRESSION_KINDS.contains(&kind)
    }

    fn is_statement_kind(&self, kind: &str) -> bool {
        STATEMENT_KINDS.contains(&kind)
    }

    fn is_block_kind(&self, kind: &str) -> bool {
        kind == "block"
    }

    fn is_non_expression_position(
        &self,
        kind: &str,
        parent_kind: &str,
        field: Option<&str>,
    ) -> bool {
        match (kind, parent_kind, field) {
            // A match arm guard is an expression even though it hangs off the pattern.
            (_, "match_pattern", Some("condition")) => return false,
            // `a.b` in `a.b()` names a method, it has no value of its own.
            ("field_expression", "call_expression", Some("function")) => return true,
            // Place expressions: extracting them would assign to the copy.
            (_, "assignment_expression" | "compound_assignment_expression", Some("left")) => {
                return true;
            }
            _ => {}
        }
        NON_EXPRESSION_PARENTS.contains(&parent_kind)
            || field.is_some_and(|f| NON_EXPRESSION_FIELDS.contains(&f))
    }

    fn is_binding_position(&self, parent_kind: &str, field: Option<&str>) -> bool {
        match (parent_kind, field) {
            (
                "let_declaration" | "parameter" | "for_expression" | "let_condition",
                Some("pattern"),
            ) => true,
            ("tuple_struct_pattern", Some("type")) => false,
            ("match_pattern", Some("condition")) => false,
            ("tuple_struct_pattern", _) => true,
            _ => BINDING_PARENTS.contains(&parent_kind),
        }
    }

    fn identifier_kind(&self) -> &'static str {
        "identifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{SyntaxNode, SyntaxTree};

    fn parse(source: &str) -> SyntaxTree {
        Rust.parse_tree(source).unwrap()
    }

    fn nodes_with_text(tree: &SyntaxTree, kind: &str, text: &str) -> Vec<SyntaxNode> {
        tree.descendants(tree.root())
            .unwrap()
            .filter(|&n| tree.kind(n).unwrap() == kind && tree.text(n).unwrap() == text)
            .collect()
    }

    #[test]
    fn test_parse_rust() {
        let tree = Rust.parse("fn main() {}").unwrap();
        assert_eq!(tree.root_node().kind(), "source_file");
    }

    #[test]
    fn test_let_pattern_is_not_an_expression() {
        let tree = parse("fn main() { let x = y; }");
        let x = nodes_with_text(&tree, "identifier", "x")[0];
        let y = nodes_with_text(&tree, "identifier", "y")[0];

        assert!(!Rust.is_expression(&tree, x));
        assert!(Rust.is_expression(&tree, y));
        assert!(Rust.is_pattern_binding(&tree, x));
        assert!(!Rust.is_pattern_binding(&tree, y));
    }

    #[test]
    fn test_function_name_is_not_an_expression() {
        let tree = parse("fn main() { main(); }");
        let names = nodes_with_text(&tree, "identifier", "main");

        assert!(!Rust.is_expression(&tree, names[0]));
        assert!(Rust.is_expression(&tree, names[1]));
    }

    #[test]
    fn test_statements() {
        let tree = parse("fn f() -> i32 { let a = 1; a; a + 1 }");
        let decl = nodes_with_text(&tree, "let_declaration", "let a = 1;")[0];
        let stmt = nodes_with_text(&tree, "expression_statement", "a;")[0];
        let tail = nodes_with_text(&tree, "binary_expression", "a + 1")[0];
        let literal = nodes_with_text(&tree, "integer_literal", "1")[0];

        assert!(Rust.is_statement(&tree, decl));
        assert!(Rust.is_statement(&tree, stmt));
        assert!(Rust.is_statement(&tree, tail));
        assert!(!Rust.is_statement(&tree, literal));
    }

    #[test]
    fn test_match_guard_is_an_expression() {
        let tree = parse("fn f(v: i32) { match v { n if n > 2 => {} _ => {} } }");
        let guard = nodes_with_text(&tree, "binary_expression", "n > 2")[0];
        assert!(Rust.is_expression(&tree, guard));
    }

    #[test]
    fn test_method_callee_is_not_an_expression() {
        let tree = parse("fn main() { let n = v.len(); let f = (s.f)(); }");
        let callee = nodes_with_text(&tree, "field_expression", "v.len")[0];
        let call = nodes_with_text(&tree, "call_expression", "v.len()")[0];
        let receiver = nodes_with_text(&tree, "identifier", "v")[0];
        let field = nodes_with_text(&tree, "field_expression", "s.f")[0];

        assert!(!Rust.is_expression(&tree, callee));
        assert!(Rust.is_expression(&tree, call));
        assert!(Rust.is_expression(&tree, receiver));
        assert!(Rust.is_expression(&tree, field));
    }

    #[test]
    fn test_shorthand_field_is_not_an_expression() {
        let tree = parse("fn main() { let p = P { x, y: x }; }");
        let names = nodes_with_text(&tree, "identifier", "x");

        assert!(!Rust.is_expression(&tree, names[0]));
        assert!(Rust.is_expression(&tree, names[1]));
    }

    #[test]
    fn test_assignment_target_is_not_an_expression() {
        let tree = parse("fn main() { x = y; x += 1; let z = x + y; }");
        let xs = nodes_with_text(&tree, "identifier", "x");
        let ys = nodes_with_text(&tree, "identifier", "y");

        assert!(!Rust.is_expression(&tree, xs[0]));
        assert!(!Rust.is_expression(&tree, xs[1]));
        assert!(Rust.is_expression(&tree, xs[2]));
        assert!(Rust.is_expression(&tree, ys[0]));
    }

    #[test]
    fn test_parse_fragment_rejects_errors() {
        assert!(Rust.parse_fragment("fn main() { 1 + ; }").is_none());
        assert!(Rust.parse_fragment("fn main() { 1 + 2; }").is_some());
    }

    #[test]
    fn test_matches_extension() {
        assert!(Rust.matches_extension("rs"));
        assert!(Rust.matches_extension("RS"));
        assert!(!Rust.matches_extension("py"));
    }
}
