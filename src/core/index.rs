//! Declaration indexing: canonical names embedding build-tag scope and
//! receiver identity.
//!
//! Keys are stable under file-to-file moves within a directory and a
//! build-tag scope, so file-granular change records still yield
//! package-granular verdicts. Pointer-receiver and value-receiver methods of
//! the same symbol live under disjoint keys; flipping between them reads as
//! remove-plus-add.

use std::collections::BTreeMap;

use crate::core::ast::{FuncDecl, GoFile, TypeDecl, TypeExpr, ValueDecl};

/// Prefix distinguishing pointer receivers (and embedded pointer fields)
/// from their value counterparts.
pub const POINTER_PREFIX: &str = "PointerType_";

const GO_BUILD_MARKER: &str = "//go:build";
const PLUS_BUILD_MARKER: &str = "// +build";

/// Exported declarations of one package side (old or new), keyed by
/// canonical name.
#[derive(Debug, Clone, Default)]
pub struct DeclIndex {
    pub types: BTreeMap<String, TypeDecl>,
    pub values: BTreeMap<String, ValueDecl>,
    pub funcs: BTreeMap<String, FuncDecl>,
}

impl DeclIndex {
    /// Fold one parsed file into the index. Only exported names are kept.
    pub fn add_file(&mut self, file: &GoFile) {
        let prefix = scope_prefix(&file.comments);
        for decl in &file.types {
            if is_exported(&decl.name) {
                self.types
                    .insert(format!("{prefix}{}", decl.name), decl.clone());
            }
        }
        for decl in &file.values {
            if is_exported(&decl.name) {
                self.values
                    .insert(format!("{prefix}{}", decl.name), decl.clone());
            }
        }
        for decl in &file.funcs {
            if is_exported(&decl.name) {
                self.funcs
                    .insert(format!("{prefix}{}", func_key(decl)), decl.clone());
            }
        }
    }
}

/// An exported Go name starts with an uppercase letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Build-tag scope prefix for a file: marker texts, sorted, joined with `_`,
/// whitespace runs collapsed to `_`, trailing `_` appended when non-empty.
///
/// Files in the same directory with different tags index into disjoint
/// namespaces, so moving a declaration across them reads as
/// removed-and-added.
pub fn scope_prefix(comments: &[String]) -> String {
    let mut tags: Vec<String> = Vec::new();
    for comment in comments {
        if let Some(rest) = comment.strip_prefix(GO_BUILD_MARKER) {
            tags.push(rest.trim().to_string());
        }
        if let Some(rest) = comment.strip_prefix(PLUS_BUILD_MARKER) {
            tags.push(rest.trim().to_string());
        }
    }
    if tags.is_empty() {
        return String::new();
    }
    tags.sort();
    let joined = tags.join("_");
    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{collapsed}_")
}

/// Canonical key for a function: the plain name, or for methods the
/// receiver identifiers each followed by `_`, then the name, with
/// [`POINTER_PREFIX`] prepended when the receiver was a pointer.
pub fn func_key(decl: &FuncDecl) -> String {
    let Some(receivers) = &decl.receivers else {
        return decl.name.clone();
    };
    let mut key = String::new();
    let mut pointer = false;
    for field in &receivers.fields {
        let (ident, peeled) = type_identifier(&field.type_expr);
        pointer |= peeled;
        key.push_str(&ident);
        key.push('_');
    }
    key.push_str(&decl.name);
    if pointer {
        format!("{POINTER_PREFIX}{key}")
    } else {
        key
    }
}

/// Derive a map-key identifier from a type expression by walking through
/// parenthesization, a generic index, a selector, and at most one pointer.
/// Returns the identifier and whether a pointer was peeled.
///
/// Shared between method receivers and embedded struct/interface fields.
pub fn type_identifier(expr: &TypeExpr) -> (String, bool) {
    let mut expr = expr;
    let mut pointer = false;
    loop {
        match expr {
            TypeExpr::Paren(inner) => expr = inner,
            TypeExpr::Pointer(inner) if !pointer => {
                pointer = true;
                expr = inner;
            }
            TypeExpr::Named(name) => return (name.clone(), pointer),
            TypeExpr::Qualified { package, name } => {
                return (format!("{package}_{name}"), pointer)
            }
            TypeExpr::Other(text) => return (generic_base(text), pointer),
            other => return (other.render(), pointer),
        }
    }
}

/// Identifier portion of an opaque rendering: `T[K]` keys as `T`,
/// `pkg.T[K]` as `pkg_T`; anything without an index is kept whole.
fn generic_base(text: &str) -> String {
    let base = text.split('[').next().unwrap_or(text).trim();
    if base.is_empty() {
        text.to_string()
    } else {
        base.replace('.', "_")
    }
}
