//! Go source parsing with tree-sitter.
//!
//! Lowers the concrete syntax tree into the declaration records of
//! [`crate::core::ast`]: top-level types, values, functions, and the comment
//! lines the indexer scans for build tags. Expression bodies are never
//! modeled; opaque type forms keep a whitespace-normalized rendering so the
//! differ can compare them textually.

use anyhow::{anyhow, bail, Result};
use tree_sitter::{Language, Node, Parser, Tree};

use crate::core::ast::{
    ChanDir, Field, FieldList, FuncDecl, GoFile, TypeDecl, TypeExpr, ValueDecl,
};

/// Reusable Go parser; `parse` may be called once per file, old and new
/// contents alike.
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let language: Language = tree_sitter_go::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| anyhow!("load Go grammar: {e}"))?;
        Ok(Self { parser })
    }

    /// Parse `source` into a raw syntax tree. Syntax errors are fatal and
    /// name the offending file.
    pub fn parse_tree(&mut self, name: &str, source: &[u8]) -> Result<Tree> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| anyhow!("parse {name}: tree-sitter produced no tree"))?;
        if tree.root_node().has_error() {
            bail!("parse {name}: invalid Go source");
        }
        Ok(tree)
    }

    /// Parse `source` and lower it to declaration records.
    pub fn parse(&mut self, name: &str, source: &[u8]) -> Result<GoFile> {
        let tree = self.parse_tree(name, source)?;
        Ok(lower_file(tree.root_node(), source))
    }
}

fn node_text(node: Node, src: &[u8]) -> String {
    node.utf8_text(src).unwrap_or_default().to_string()
}

/// Canonical rendering for opaque spans: whitespace runs collapse to single
/// spaces so formatting-only edits compare equal.
fn rendered_text(node: Node, src: &[u8]) -> String {
    node.utf8_text(src)
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn field_texts(node: Node, field: &str, src: &[u8]) -> Vec<String> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor)
        .map(|n| node_text(n, src))
        .collect()
}

fn lower_file(root: Node, src: &[u8]) -> GoFile {
    let mut file = GoFile::default();
    for i in 0..root.named_child_count() {
        let Some(node) = root.named_child(i) else { continue };
        match node.kind() {
            "comment" => file.comments.push(node_text(node, src)),
            "type_declaration" => lower_type_declaration(node, src, &mut file),
            "const_declaration" | "var_declaration" => {
                lower_value_declaration(node, src, &mut file)
            }
            "function_declaration" => {
                if let Some(func) = lower_function(node, src, false) {
                    file.funcs.push(func);
                }
            }
            "method_declaration" => {
                if let Some(func) = lower_function(node, src, true) {
                    file.funcs.push(func);
                }
            }
            _ => {}
        }
    }
    file
}

fn lower_type_declaration(node: Node, src: &[u8], file: &mut GoFile) {
    for i in 0..node.named_child_count() {
        let Some(spec) = node.named_child(i) else { continue };
        if !matches!(spec.kind(), "type_spec" | "type_alias") {
            continue;
        }
        let Some(name) = spec.child_by_field_name("name") else { continue };
        let body = match spec.child_by_field_name("type") {
            Some(ty) => lower_type(ty, src),
            None => TypeExpr::Other(rendered_text(spec, src)),
        };
        file.types.push(TypeDecl {
            name: node_text(name, src),
            type_params: spec
                .child_by_field_name("type_parameters")
                .map(|n| lower_type_param_list(n, src)),
            alias: spec.kind() == "type_alias",
            body,
        });
    }
}

fn lower_value_declaration(node: Node, src: &[u8], file: &mut GoFile) {
    let mut specs = Vec::new();
    collect_value_specs(node, &mut specs);
    for spec in specs {
        let type_expr = spec
            .child_by_field_name("type")
            .map(|ty| lower_type(ty, src));
        // One entry per declared name; all names of a spec share its type.
        for name in field_texts(spec, "name", src) {
            file.values.push(ValueDecl { name, type_expr: type_expr.clone() });
        }
    }
}

/// Grouped `var ( ... )` blocks nest their specs under a list node in some
/// grammar revisions; accept both shapes.
fn collect_value_specs<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    for i in 0..node.named_child_count() {
        let Some(child) = node.named_child(i) else { continue };
        match child.kind() {
            "const_spec" | "var_spec" => out.push(child),
            "var_spec_list" | "const_spec_list" => collect_value_specs(child, out),
            _ => {}
        }
    }
}

fn lower_function(node: Node, src: &[u8], is_method: bool) -> Option<FuncDecl> {
    let name = node.child_by_field_name("name")?;
    let receivers = if is_method {
        node.child_by_field_name("receiver")
            .map(|r| lower_parameter_list(r, src))
    } else {
        None
    };
    Some(FuncDecl {
        name: node_text(name, src),
        receivers,
        type_params: node
            .child_by_field_name("type_parameters")
            .map(|n| lower_type_param_list(n, src)),
        params: node
            .child_by_field_name("parameters")
            .map(|n| lower_parameter_list(n, src)),
        results: node
            .child_by_field_name("result")
            .map(|n| lower_result(n, src)),
    })
}

fn lower_parameter_list(node: Node, src: &[u8]) -> FieldList {
    let mut fields = Vec::new();
    for i in 0..node.named_child_count() {
        let Some(param) = node.named_child(i) else { continue };
        match param.kind() {
            "parameter_declaration" => {
                let type_expr = match param.child_by_field_name("type") {
                    Some(ty) => lower_type(ty, src),
                    None => TypeExpr::Other(rendered_text(param, src)),
                };
                fields.push(Field {
                    names: field_texts(param, "name", src),
                    type_expr,
                    tag: None,
                });
            }
            "variadic_parameter_declaration" => {
                // `...T` compares textually; any element change is breaking,
                // as is a flip between variadic and slice forms.
                let elem = param
                    .child_by_field_name("type")
                    .map(|ty| rendered_text(ty, src))
                    .unwrap_or_default();
                fields.push(Field {
                    names: field_texts(param, "name", src),
                    type_expr: TypeExpr::Other(format!("...{elem}")),
                    tag: None,
                });
            }
            _ => {}
        }
    }
    FieldList { fields }
}

fn lower_type_param_list(node: Node, src: &[u8]) -> FieldList {
    let mut fields = Vec::new();
    for i in 0..node.named_child_count() {
        let Some(param) = node.named_child(i) else { continue };
        if param.kind() != "type_parameter_declaration" {
            continue;
        }
        let type_expr = match param.child_by_field_name("type") {
            Some(constraint) => lower_type(constraint, src),
            None => TypeExpr::Other(rendered_text(param, src)),
        };
        fields.push(Field {
            names: field_texts(param, "name", src),
            type_expr,
            tag: None,
        });
    }
    FieldList { fields }
}

/// A result is either a parenthesized parameter list or a single bare type.
fn lower_result(node: Node, src: &[u8]) -> FieldList {
    if node.kind() == "parameter_list" {
        lower_parameter_list(node, src)
    } else {
        FieldList {
            fields: vec![Field {
                names: Vec::new(),
                type_expr: lower_type(node, src),
                tag: None,
            }],
        }
    }
}

fn lower_type(node: Node, src: &[u8]) -> TypeExpr {
    match node.kind() {
        "type_identifier" | "identifier" => TypeExpr::Named(node_text(node, src)),
        "qualified_type" => {
            let package = node
                .child_by_field_name("package")
                .map(|n| node_text(n, src))
                .unwrap_or_default();
            let name = node
                .child_by_field_name("name")
                .map(|n| node_text(n, src))
                .unwrap_or_default();
            TypeExpr::Qualified { package, name }
        }
        "parenthesized_type" => match node.named_child(0) {
            Some(inner) => TypeExpr::Paren(Box::new(lower_type(inner, src))),
            None => TypeExpr::Other(rendered_text(node, src)),
        },
        "pointer_type" => match node.named_child(0) {
            Some(inner) => TypeExpr::Pointer(Box::new(lower_type(inner, src))),
            None => TypeExpr::Other(rendered_text(node, src)),
        },
        "array_type" => TypeExpr::Array {
            length: node
                .child_by_field_name("length")
                .map(|n| rendered_text(n, src)),
            elem: lower_child_type(node, "element", src),
        },
        "slice_type" => TypeExpr::Array {
            length: None,
            elem: lower_child_type(node, "element", src),
        },
        "implicit_length_array_type" => TypeExpr::Array {
            length: Some("...".to_string()),
            elem: lower_child_type(node, "element", src),
        },
        "struct_type" => lower_struct(node, src),
        "function_type" | "func_type" => TypeExpr::Func {
            type_params: None,
            params: node
                .child_by_field_name("parameters")
                .map(|n| lower_parameter_list(n, src)),
            results: node
                .child_by_field_name("result")
                .map(|n| lower_result(n, src)),
        },
        "interface_type" => lower_interface(node, src),
        "map_type" => TypeExpr::Map {
            key: lower_child_type(node, "key", src),
            value: lower_child_type(node, "value", src),
        },
        "channel_type" => lower_channel(node, src),
        // Constraint wrappers around a single type are transparent; unions
        // stay opaque.
        "type_elem" | "type_constraint" | "constraint_elem" => {
            match (node.named_child_count(), node.named_child(0)) {
                (1, Some(inner)) => lower_type(inner, src),
                _ => TypeExpr::Other(rendered_text(node, src)),
            }
        }
        // Generic instantiations, unions, negations, and anything newer than
        // this lowering stay opaque and compare textually.
        _ => TypeExpr::Other(rendered_text(node, src)),
    }
}

fn lower_child_type(node: Node, field: &str, src: &[u8]) -> Box<TypeExpr> {
    Box::new(match node.child_by_field_name(field) {
        Some(child) => lower_type(child, src),
        None => TypeExpr::Other(rendered_text(node, src)),
    })
}

fn lower_struct(node: Node, src: &[u8]) -> TypeExpr {
    let mut list = None;
    for i in 0..node.named_child_count() {
        let Some(child) = node.named_child(i) else { continue };
        if child.kind() != "field_declaration_list" {
            continue;
        }
        let mut fields = Vec::new();
        for j in 0..child.named_child_count() {
            let Some(decl) = child.named_child(j) else { continue };
            if decl.kind() != "field_declaration" {
                continue;
            }
            let names = field_texts(decl, "name", src);
            let mut type_expr = match decl.child_by_field_name("type") {
                Some(ty) => lower_type(ty, src),
                None => TypeExpr::Other(rendered_text(decl, src)),
            };
            // The grammar keeps the `*` of an embedded pointer field outside
            // the type field; fold it back so embedded `*T` keys like a
            // pointer receiver.
            if names.is_empty() && has_token(decl, "*") {
                type_expr = TypeExpr::Pointer(Box::new(type_expr));
            }
            fields.push(Field {
                names,
                type_expr,
                tag: decl.child_by_field_name("tag").map(|t| node_text(t, src)),
            });
        }
        list = Some(FieldList { fields });
    }
    TypeExpr::Struct { fields: list, incomplete: false }
}

fn lower_interface(node: Node, src: &[u8]) -> TypeExpr {
    let mut fields = Vec::new();
    for i in 0..node.named_child_count() {
        let Some(elem) = node.named_child(i) else { continue };
        match elem.kind() {
            "method_elem" | "method_spec" => {
                let Some(name) = elem.child_by_field_name("name") else { continue };
                fields.push(Field {
                    names: vec![node_text(name, src)],
                    type_expr: TypeExpr::Func {
                        type_params: None,
                        params: elem
                            .child_by_field_name("parameters")
                            .map(|n| lower_parameter_list(n, src)),
                        results: elem
                            .child_by_field_name("result")
                            .map(|n| lower_result(n, src)),
                    },
                    tag: None,
                });
            }
            "comment" => {}
            // Embedded interfaces and constraint elements; `lower_type`
            // unwraps single-type constraint wrappers.
            _ => fields.push(Field {
                names: Vec::new(),
                type_expr: lower_type(elem, src),
                tag: None,
            }),
        }
    }
    TypeExpr::Interface { methods: Some(FieldList { fields }), incomplete: false }
}

fn lower_channel(node: Node, src: &[u8]) -> TypeExpr {
    let mut has_arrow = false;
    let mut arrow_before_chan = false;
    let mut seen_chan = false;
    for i in 0..node.child_count() {
        let Some(child) = node.child(i) else { continue };
        match child.kind() {
            "chan" => seen_chan = true,
            "<-" => {
                has_arrow = true;
                if !seen_chan {
                    arrow_before_chan = true;
                }
            }
            _ => {}
        }
    }
    let dir = match (has_arrow, arrow_before_chan) {
        (false, _) => ChanDir::Both,
        (true, true) => ChanDir::Recv,
        (true, false) => ChanDir::Send,
    };
    TypeExpr::Chan { has_arrow, dir, elem: lower_child_type(node, "value", src) }
}

fn has_token(node: Node, token: &str) -> bool {
    (0..node.child_count())
        .filter_map(|i| node.child(i))
        .any(|c| c.kind() == token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> GoFile {
        GoParser::new()
            .unwrap()
            .parse("test.go", src.as_bytes())
            .unwrap()
    }

    #[test]
    fn rejects_invalid_source() {
        let mut parser = GoParser::new().unwrap();
        assert!(parser.parse("bad.go", b"package demo\n\nfunc {").is_err());
    }

    #[test]
    fn collects_top_level_comments() {
        let file = parse(
            "//go:build linux\n\npackage demo\n\n// helper\nfunc f() {}\n",
        );
        assert!(file.comments.iter().any(|c| c == "//go:build linux"));
        assert!(file.comments.iter().any(|c| c == "// helper"));
    }

    #[test]
    fn lowers_struct_with_tags_and_embedding() {
        let file = parse(
            "package demo\n\ntype T struct {\n\tA int `json:\"a\"`\n\tB, C string\n\t*Base\n\tio.Reader\n}\n",
        );
        assert_eq!(file.types.len(), 1);
        let TypeExpr::Struct { fields: Some(list), .. } = &file.types[0].body else {
            panic!("expected struct body");
        };
        assert_eq!(list.fields.len(), 4);
        assert_eq!(list.fields[0].names, vec!["A"]);
        assert_eq!(list.fields[0].tag.as_deref(), Some("`json:\"a\"`"));
        assert_eq!(list.fields[1].names, vec!["B", "C"]);
        assert_eq!(
            list.fields[2].type_expr,
            TypeExpr::Pointer(Box::new(TypeExpr::Named("Base".into())))
        );
        assert_eq!(
            list.fields[3].type_expr,
            TypeExpr::Qualified { package: "io".into(), name: "Reader".into() }
        );
        assert_eq!(list.num_entries(), 5);
    }

    #[test]
    fn lowers_alias_and_definition() {
        let file = parse("package demo\n\ntype A = B\ntype C B\n");
        assert_eq!(file.types.len(), 2);
        assert!(file.types[0].alias);
        assert!(!file.types[1].alias);
        assert_eq!(file.types[0].body, TypeExpr::Named("B".into()));
    }

    #[test]
    fn lowers_values_one_entry_per_name() {
        let file = parse(
            "package demo\n\nconst Name = \"x\"\nvar A, b, C int\nvar (\n\tD string\n\tE = 1\n)\n",
        );
        let names: Vec<&str> = file.values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Name", "A", "b", "C", "D", "E"]);
        assert_eq!(file.values[0].type_expr, None);
        assert_eq!(file.values[1].type_expr, Some(TypeExpr::Named("int".into())));
        assert_eq!(file.values[4].type_expr, Some(TypeExpr::Named("string".into())));
    }

    #[test]
    fn lowers_method_with_pointer_receiver() {
        let file = parse(
            "package demo\n\nfunc (t *T) M(x int, y int) (string, error) { return \"\", nil }\n",
        );
        assert_eq!(file.funcs.len(), 1);
        let func = &file.funcs[0];
        assert_eq!(func.name, "M");
        let recv = func.receivers.as_ref().unwrap();
        assert_eq!(
            recv.fields[0].type_expr,
            TypeExpr::Pointer(Box::new(TypeExpr::Named("T".into())))
        );
        assert_eq!(func.params.as_ref().unwrap().num_entries(), 2);
        assert_eq!(func.results.as_ref().unwrap().num_entries(), 2);
    }

    #[test]
    fn lowers_bare_result_type() {
        let file = parse("package demo\n\nfunc F() error { return nil }\n");
        let results = file.funcs[0].results.as_ref().unwrap();
        assert_eq!(results.fields.len(), 1);
        assert_eq!(results.fields[0].type_expr, TypeExpr::Named("error".into()));
    }

    #[test]
    fn lowers_generics_as_positional_entries() {
        let file = parse("package demo\n\nfunc F[T any, U comparable](x T) U { var u U; return u }\n");
        let tp = file.funcs[0].type_params.as_ref().unwrap();
        assert_eq!(tp.num_entries(), 2);
        assert_eq!(tp.fields[0].type_expr, TypeExpr::Named("any".into()));
    }

    #[test]
    fn lowers_channel_directions() {
        let file = parse(
            "package demo\n\nvar A chan int\nvar B chan<- int\nvar C <-chan int\n",
        );
        let dirs: Vec<ChanDir> = file
            .values
            .iter()
            .map(|v| match v.type_expr.as_ref().unwrap() {
                TypeExpr::Chan { dir, .. } => *dir,
                other => panic!("expected channel, got {other:?}"),
            })
            .collect();
        assert_eq!(dirs, vec![ChanDir::Both, ChanDir::Send, ChanDir::Recv]);
    }

    #[test]
    fn lowers_interface_methods_and_embeds() {
        let file = parse(
            "package demo\n\ntype I interface {\n\tRead(p []byte) (int, error)\n\tio.Closer\n}\n",
        );
        let TypeExpr::Interface { methods: Some(list), .. } = &file.types[0].body else {
            panic!("expected interface body");
        };
        assert_eq!(list.fields.len(), 2);
        assert_eq!(list.fields[0].names, vec!["Read"]);
        assert!(matches!(list.fields[0].type_expr, TypeExpr::Func { .. }));
        assert!(list.fields[1].names.is_empty());
    }

    #[test]
    fn variadic_parameters_render_opaquely() {
        let file = parse("package demo\n\nfunc F(xs ...int) {}\n");
        let params = file.funcs[0].params.as_ref().unwrap();
        assert_eq!(params.fields[0].type_expr, TypeExpr::Other("...int".into()));
    }

    #[test]
    fn lowers_maps_arrays_and_slices() {
        let file = parse(
            "package demo\n\nvar M map[string]int\nvar A [4]byte\nvar S []byte\n",
        );
        assert!(matches!(
            file.values[0].type_expr.as_ref().unwrap(),
            TypeExpr::Map { .. }
        ));
        assert_eq!(
            file.values[1].type_expr,
            Some(TypeExpr::Array {
                length: Some("4".into()),
                elem: Box::new(TypeExpr::Named("byte".into())),
            })
        );
        assert_eq!(
            file.values[2].type_expr,
            Some(TypeExpr::Array {
                length: None,
                elem: Box::new(TypeExpr::Named("byte".into())),
            })
        );
    }
}
