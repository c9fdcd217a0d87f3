//! Declaration-level model of a parsed Go file.
//!
//! The parser deep-copies everything the indexer and differ need out of the
//! tree-sitter CST, so these values own their data and outlive the parse.

/// Channel direction as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

/// A Go type expression, tagged by structural variant.
///
/// Variants carry exactly what structural comparison needs; anything the
/// comparator treats opaquely (generic instantiations, unions, constants in
/// odd positions) collapses into [`TypeExpr::Other`] with a canonical
/// whitespace-normalized rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// Plain identifier: `int`, `Reader`
    Named(String),
    /// Package-qualified name: `io.Reader`
    Qualified { package: String, name: String },
    /// Parenthesized type: `(T)`
    Paren(Box<TypeExpr>),
    /// Pointer: `*T`
    Pointer(Box<TypeExpr>),
    /// Array or slice; `length` is `None` for slices, the rendered length
    /// expression for arrays (`...` for implicit-length arrays)
    Array { length: Option<String>, elem: Box<TypeExpr> },
    /// Struct body
    Struct { fields: Option<FieldList>, incomplete: bool },
    /// Function signature used as a type
    Func {
        type_params: Option<FieldList>,
        params: Option<FieldList>,
        results: Option<FieldList>,
    },
    /// Interface body; methods hold named entries, embedded interfaces are
    /// unnamed fields
    Interface { methods: Option<FieldList>, incomplete: bool },
    /// `map[K]V`
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    /// Channel; `has_arrow` records whether a `<-` appeared at all
    Chan { has_arrow: bool, dir: ChanDir, elem: Box<TypeExpr> },
    /// Opaque rendered text
    Other(String),
}

impl TypeExpr {
    /// Canonical textual form, used where the comparison is textual and as
    /// the fallback identifier for unusual embedded fields.
    pub fn render(&self) -> String {
        match self {
            TypeExpr::Named(name) => name.clone(),
            TypeExpr::Qualified { package, name } => format!("{package}.{name}"),
            TypeExpr::Paren(inner) => format!("({})", inner.render()),
            TypeExpr::Pointer(inner) => format!("*{}", inner.render()),
            TypeExpr::Array { length: Some(len), elem } => {
                format!("[{len}]{}", elem.render())
            }
            TypeExpr::Array { length: None, elem } => format!("[]{}", elem.render()),
            TypeExpr::Struct { .. } => "struct{...}".to_string(),
            TypeExpr::Func { .. } => "func(...)".to_string(),
            TypeExpr::Interface { .. } => "interface{...}".to_string(),
            TypeExpr::Map { key, value } => {
                format!("map[{}]{}", key.render(), value.render())
            }
            TypeExpr::Chan { dir: ChanDir::Send, elem, .. } => {
                format!("chan<- {}", elem.render())
            }
            TypeExpr::Chan { dir: ChanDir::Recv, elem, .. } => {
                format!("<-chan {}", elem.render())
            }
            TypeExpr::Chan { dir: ChanDir::Both, elem, .. } => {
                format!("chan {}", elem.render())
            }
            TypeExpr::Other(text) => text.clone(),
        }
    }
}

/// One field group: `a, b int` keeps both names on a single entry; embedded
/// fields and unnamed parameters have no names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub names: Vec<String>,
    pub type_expr: TypeExpr,
    /// Raw struct tag literal, backticks included
    pub tag: Option<String>,
}

/// Ordered list of field groups (struct body, parameters, results, generics,
/// interface methods, receivers).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldList {
    pub fields: Vec<Field>,
}

impl FieldList {
    /// Number of declared entries, counting each name once and unnamed
    /// groups as one.
    pub fn num_entries(&self) -> usize {
        self.fields
            .iter()
            .map(|f| f.names.len().max(1))
            .sum()
    }
}

/// `type Name [T any] = Body` / `type Name [T any] Body`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub type_params: Option<FieldList>,
    pub alias: bool,
    pub body: TypeExpr,
}

/// One name of a `const` or `var` specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueDecl {
    pub name: String,
    /// Declared type, when one is written; initializer expressions are
    /// never modeled
    pub type_expr: Option<TypeExpr>,
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    /// `None` for plain functions
    pub receivers: Option<FieldList>,
    pub type_params: Option<FieldList>,
    pub params: Option<FieldList>,
    pub results: Option<FieldList>,
}

/// A parsed Go source file, reduced to what indexing needs.
#[derive(Debug, Clone, Default)]
pub struct GoFile {
    /// Text of every top-level comment, for build-tag scanning
    pub comments: Vec<String>,
    pub types: Vec<TypeDecl>,
    pub values: Vec<ValueDecl>,
    pub funcs: Vec<FuncDecl>,
}
