//! Structural comparison of declarations under API-compatibility rules.
//!
//! Every helper is total: it returns a [`Change`] severity, never an error.
//! The default discipline is conservative — two type expressions of
//! different variants always break, and most containers escalate any inner
//! difference to breaking. Structs are the one lenient spot: their named
//! field rule can report an addition.

use std::collections::BTreeMap;

use crate::core::ast::{Field, FieldList, FuncDecl, TypeDecl, TypeExpr, ValueDecl};
use crate::core::index::{type_identifier, DeclIndex, POINTER_PREFIX};
use crate::core::version::Change;

/// Compare two type expressions by structural variant.
pub fn type_expr_diff(old: &TypeExpr, new: &TypeExpr) -> Change {
    use TypeExpr as T;
    match (old, new) {
        (T::Named(a), T::Named(b)) => textual(a == b),
        (T::Qualified { package: ap, name: an }, T::Qualified { package: bp, name: bn }) => {
            textual(ap == bp && an == bn)
        }
        (T::Other(a), T::Other(b)) => textual(a == b),
        (T::Paren(a), T::Paren(b)) => type_expr_diff(a, b),
        // Any change behind a pointer forces callers to adjust.
        (T::Pointer(a), T::Pointer(b)) => escalate(type_expr_diff(a, b)),
        (T::Array { length: al, elem: ae }, T::Array { length: bl, elem: be }) => {
            if al != bl {
                Change::Breaking
            } else {
                escalate(type_expr_diff(ae, be))
            }
        }
        (
            T::Struct { fields: af, incomplete: ai },
            T::Struct { fields: bf, incomplete: bi },
        ) => {
            if ai != bi {
                Change::Breaking
            } else {
                named_fields_diff(af.as_ref(), bf.as_ref())
            }
        }
        (
            T::Func { type_params: atp, params: ap, results: ar },
            T::Func { type_params: btp, params: bp, results: br },
        ) => signature_diff(
            (atp.as_ref(), ap.as_ref(), ar.as_ref()),
            (btp.as_ref(), bp.as_ref(), br.as_ref()),
        ),
        (
            T::Interface { methods: am, incomplete: ai },
            T::Interface { methods: bm, incomplete: bi },
        ) => {
            // Adding a method obliges every implementor, so even the
            // addition verdict escalates.
            if ai != bi {
                Change::Breaking
            } else {
                escalate(named_fields_diff(am.as_ref(), bm.as_ref()))
            }
        }
        (T::Map { key: ak, value: av }, T::Map { key: bk, value: bv }) => {
            if type_expr_diff(ak, bk) != Change::None {
                Change::Breaking
            } else {
                escalate(type_expr_diff(av, bv))
            }
        }
        (
            T::Chan { has_arrow: aa, dir: ad, elem: ae },
            T::Chan { has_arrow: ba, dir: bd, elem: be },
        ) => {
            if aa != ba || ad != bd {
                Change::Breaking
            } else {
                escalate(type_expr_diff(ae, be))
            }
        }
        _ => Change::Breaking,
    }
}

fn textual(equal: bool) -> Change {
    if equal {
        Change::None
    } else {
        Change::Breaking
    }
}

fn escalate(change: Change) -> Change {
    if change == Change::None {
        Change::None
    } else {
        Change::Breaking
    }
}

/// Positional comparison for generics, parameters, and results: name groups
/// flatten to one entry per declared name, names themselves are ignored, and
/// any length or type mismatch is breaking.
pub fn pos_fields_diff(old: Option<&FieldList>, new: Option<&FieldList>) -> Change {
    match (old, new) {
        (None, None) => Change::None,
        (Some(_), None) | (None, Some(_)) => Change::Breaking,
        (Some(old), Some(new)) => {
            let old_types = flatten(old);
            let new_types = flatten(new);
            if old_types.len() != new_types.len() {
                return Change::Breaking;
            }
            for (old_ty, new_ty) in old_types.iter().zip(&new_types) {
                if type_expr_diff(old_ty, new_ty) != Change::None {
                    return Change::Breaking;
                }
            }
            Change::None
        }
    }
}

/// One type entry per declared name; unnamed groups count once.
fn flatten(list: &FieldList) -> Vec<&TypeExpr> {
    let mut out = Vec::with_capacity(list.fields.len());
    for field in &list.fields {
        for _ in 0..field.names.len().max(1) {
            out.push(&field.type_expr);
        }
    }
    out
}

/// Named comparison for struct fields and interface methods.
pub fn named_fields_diff(old: Option<&FieldList>, new: Option<&FieldList>) -> Change {
    match (old, new) {
        (None, None) => Change::None,
        (Some(_), None) => Change::Breaking,
        (None, Some(_)) => Change::Addition,
        (Some(old), Some(new)) => {
            let old_map = named_map(old);
            let new_map = named_map(new);
            let mut worst = Change::None;
            for (name, old_field) in &old_map {
                let Some(new_field) = new_map.get(name) else {
                    return Change::Breaking;
                };
                let change = field_diff(old_field, new_field);
                if change == Change::Breaking {
                    return Change::Breaking;
                }
                worst = worst.max(change);
            }
            if new_map.len() > old_map.len() {
                worst = worst.max(Change::Addition);
            }
            worst
        }
    }
}

/// Key fields by name; embedded fields key by the receiver type-identifier
/// algorithm, pointer-prefixed when applicable.
fn named_map(list: &FieldList) -> BTreeMap<String, &Field> {
    let mut map = BTreeMap::new();
    for field in &list.fields {
        if field.names.is_empty() {
            let (ident, pointer) = type_identifier(&field.type_expr);
            let key = if pointer {
                format!("{POINTER_PREFIX}{ident}")
            } else {
                ident
            };
            map.insert(key, field);
        } else {
            for name in &field.names {
                map.insert(name.clone(), field);
            }
        }
    }
    map
}

fn field_diff(old: &Field, new: &Field) -> Change {
    let change = type_expr_diff(&old.type_expr, &new.type_expr);
    if change != Change::None {
        return change;
    }
    tag_diff(old.tag.as_deref(), new.tag.as_deref())
}

/// Gaining or editing a tag only extends what consumers can rely on; losing
/// one removes it.
fn tag_diff(old: Option<&str>, new: Option<&str>) -> Change {
    match (old, new) {
        (None, None) => Change::None,
        (Some(_), None) => Change::Breaking,
        (None, Some(_)) => Change::Addition,
        (Some(a), Some(b)) => {
            if a == b {
                Change::None
            } else {
                Change::Addition
            }
        }
    }
}

type Signature<'a> = (
    Option<&'a FieldList>,
    Option<&'a FieldList>,
    Option<&'a FieldList>,
);

/// Generics, parameters, and results compared positionally; any difference
/// is breaking.
fn signature_diff(old: Signature<'_>, new: Signature<'_>) -> Change {
    let (old_generics, old_params, old_results) = old;
    let (new_generics, new_params, new_results) = new;
    if pos_fields_diff(old_generics, new_generics) != Change::None
        || pos_fields_diff(old_params, new_params) != Change::None
        || pos_fields_diff(old_results, new_results) != Change::None
    {
        Change::Breaking
    } else {
        Change::None
    }
}

/// Compare two type declarations sharing a canonical name.
pub fn type_decl_diff(old: &TypeDecl, new: &TypeDecl) -> Change {
    if pos_fields_diff(old.type_params.as_ref(), new.type_params.as_ref()) != Change::None {
        return Change::Breaking;
    }
    if old.alias != new.alias {
        return Change::Breaking;
    }
    // Struct-body additions propagate as additions.
    type_expr_diff(&old.body, &new.body)
}

/// Compare two value declarations sharing a canonical name. Initializers are
/// never compared: different expressions can produce equal values.
pub fn value_decl_diff(old: &ValueDecl, new: &ValueDecl) -> Change {
    if let (Some(old_ty), Some(new_ty)) = (&old.type_expr, &new.type_expr) {
        if type_expr_diff(old_ty, new_ty) != Change::None {
            return Change::Breaking;
        }
    }
    Change::None
}

/// Compare two function declarations sharing a canonical name. Receiver
/// identity is already encoded in the key; parameter names are ignored.
pub fn func_decl_diff(old: &FuncDecl, new: &FuncDecl) -> Change {
    signature_diff(
        (
            old.type_params.as_ref(),
            old.params.as_ref(),
            old.results.as_ref(),
        ),
        (
            new.type_params.as_ref(),
            new.params.as_ref(),
            new.results.as_ref(),
        ),
    )
}

/// Match the old index one-to-one against the new and classify the package.
///
/// A missing old name is breaking; per-declaration additions and index
/// growth yield an addition; otherwise the files changed in ways the index
/// cannot see, which is a patch.
pub fn index_diff(old: &DeclIndex, new: &DeclIndex) -> Change {
    let mut addition = false;

    for (name, old_decl) in &old.types {
        let Some(new_decl) = new.types.get(name) else {
            return Change::Breaking;
        };
        match type_decl_diff(old_decl, new_decl) {
            Change::Breaking => return Change::Breaking,
            Change::Addition => addition = true,
            _ => {}
        }
    }
    for (name, old_decl) in &old.values {
        let Some(new_decl) = new.values.get(name) else {
            return Change::Breaking;
        };
        if value_decl_diff(old_decl, new_decl) == Change::Breaking {
            return Change::Breaking;
        }
    }
    for (name, old_decl) in &old.funcs {
        let Some(new_decl) = new.funcs.get(name) else {
            return Change::Breaking;
        };
        if func_decl_diff(old_decl, new_decl) == Change::Breaking {
            return Change::Breaking;
        }
    }

    addition = addition
        || new.types.len() > old.types.len()
        || new.values.len() > old.values.len()
        || new.funcs.len() > old.funcs.len();
    if addition {
        Change::Addition
    } else {
        Change::Patch
    }
}
