//! Rewrites the first embedded version literal of a Go source file to the
//! computed next version.
//!
//! The replacement is a byte-splice of the literal's span, so everything
//! outside the literal survives byte-for-byte.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use tree_sitter::Node;

use crate::core::version::{Change, SemanticVersion};
use crate::parsers::go_parser::GoParser;

/// Replace the first string literal holding a valid semantic version with
/// the next version for `change`.
///
/// When `seed` is a valid version it overrides the parsed literal as the
/// base; otherwise the literal's own value is bumped. A file without any
/// version literal is left untouched.
pub fn rewrite_version_literal(
    path: &Path,
    seed: Option<SemanticVersion>,
    change: Change,
) -> Result<()> {
    let name = path.display().to_string();
    let source = fs::read(path).with_context(|| format!("read {name}"))?;

    let mut parser = GoParser::new()?;
    let tree = parser.parse_tree(&name, &source)?;

    let mut literals = Vec::new();
    collect_string_literals(tree.root_node(), &mut literals);

    for node in literals {
        let text = node.utf8_text(&source).unwrap_or_default();
        let Some(current) = unquote(text).and_then(|lit| lit.parse::<SemanticVersion>().ok())
        else {
            continue;
        };
        if !current.valid() {
            continue;
        }

        let base = seed.filter(SemanticVersion::valid).unwrap_or(current);
        let next = base.next(change);
        debug!(%current, %next, file = %name, "rewriting version literal");

        let mut rewritten = Vec::with_capacity(source.len());
        rewritten.extend_from_slice(&source[..node.start_byte()]);
        rewritten.extend_from_slice(format!("\"{next}\"").as_bytes());
        rewritten.extend_from_slice(&source[node.end_byte()..]);

        write_source(path, &rewritten).with_context(|| format!("write {name}"))?;
        return Ok(());
    }

    debug!(file = %name, "no version literal found");
    Ok(())
}

/// Collect string-literal nodes in source order.
fn collect_string_literals<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    if matches!(node.kind(), "interpreted_string_literal" | "raw_string_literal") {
        out.push(node);
        return;
    }
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i) {
            collect_string_literals(child, out);
        }
    }
}

/// Unquote a Go string literal: backtick raw strings verbatim, double-quoted
/// strings with the escapes a version literal could plausibly contain.
fn unquote(literal: &str) -> Option<String> {
    if let Some(raw) = literal
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        return Some(raw.to_string());
    }
    let inner = literal
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Some(out)
}

/// Write the rewritten file with `rw-r--r--` permissions.
fn write_source(path: &Path, content: &[u8]) -> Result<()> {
    fs::write(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o644))?;
    }
    Ok(())
}
