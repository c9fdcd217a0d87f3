//! Package aggregation: group changed files by directory, build old and new
//! declaration indexes, and fold per-package verdicts into a repository
//! verdict.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::diff;
use crate::core::git::{ChangedFile, GitWorktree};
use crate::core::index::DeclIndex;
use crate::core::version::Change;
use crate::parsers::go_parser::GoParser;

/// Changed paths of one directory, split into the base-revision side and the
/// working-tree side. Directories are identified with packages.
#[derive(Debug, Default)]
pub struct ChangedDir {
    pub olds: Vec<PathBuf>,
    pub news: Vec<PathBuf>,
}

/// Group change records by directory. A cross-directory rename contributes
/// its old path to one package and its new path to another.
pub fn group_by_directory(files: Vec<ChangedFile>) -> BTreeMap<PathBuf, ChangedDir> {
    let mut dirs: BTreeMap<PathBuf, ChangedDir> = BTreeMap::new();
    for file in files {
        if let Some(old) = file.old {
            dirs.entry(parent_dir(&old)).or_default().olds.push(old);
        }
        if let Some(new) = file.new {
            dirs.entry(parent_dir(&new)).or_default().news.push(new);
        }
    }
    dirs
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Classify the uncommitted API delta of the whole working tree.
///
/// The repository verdict is the maximum over per-package verdicts; packages
/// are processed sequentially and their indexes are released as soon as each
/// verdict is in.
pub fn detect_change(worktree: &GitWorktree, extension: &str) -> Result<Change> {
    let files = worktree.changed_files(extension)?;
    if files.is_empty() {
        return Ok(Change::None);
    }

    let mut parser = GoParser::new()?;
    let mut top = Change::None;
    for (dir, group) in group_by_directory(files) {
        let verdict = diff_package(worktree, &mut parser, &group)?;
        debug!(dir = %dir.display(), %verdict, "package verdict");
        top = top.max(verdict);
    }
    Ok(top)
}

/// Diff one package: the old index comes only from version-control content,
/// the new index only from the working tree.
fn diff_package(
    worktree: &GitWorktree,
    parser: &mut GoParser,
    group: &ChangedDir,
) -> Result<Change> {
    let mut old_index = DeclIndex::default();
    let mut new_index = DeclIndex::default();

    for path in &group.olds {
        let name = path.display().to_string();
        // Absent at the base revision: a freshly added file has no old side.
        let Some(source) = worktree.show_at_base(path)? else {
            continue;
        };
        let file = parser.parse(&name, &source)?;
        old_index.add_file(&file);
    }

    for path in &group.news {
        let name = path.display().to_string();
        let source = std::fs::read(worktree.root().join(path))
            .with_context(|| format!("read {name}"))?;
        let file = parser.parse(&name, &source)?;
        new_index.add_file(&file);
    }

    Ok(diff::index_diff(&old_index, &new_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(old: Option<&str>, new: Option<&str>) -> ChangedFile {
        ChangedFile {
            old: old.map(PathBuf::from),
            new: new.map(PathBuf::from),
        }
    }

    #[test]
    fn groups_modifications_by_directory() {
        let dirs = group_by_directory(vec![
            changed(Some("pkg/a.go"), Some("pkg/a.go")),
            changed(Some("pkg/b.go"), Some("pkg/b.go")),
            changed(Some("other/c.go"), Some("other/c.go")),
        ]);
        assert_eq!(dirs.len(), 2);
        let pkg = &dirs[Path::new("pkg")];
        assert_eq!(pkg.olds.len(), 2);
        assert_eq!(pkg.news.len(), 2);
    }

    #[test]
    fn cross_directory_rename_splits_sides() {
        let dirs = group_by_directory(vec![changed(Some("a/x.go"), Some("b/x.go"))]);
        assert_eq!(dirs[Path::new("a")].olds, vec![PathBuf::from("a/x.go")]);
        assert!(dirs[Path::new("a")].news.is_empty());
        assert_eq!(dirs[Path::new("b")].news, vec![PathBuf::from("b/x.go")]);
        assert!(dirs[Path::new("b")].olds.is_empty());
    }

    #[test]
    fn deletion_has_no_new_side() {
        let dirs = group_by_directory(vec![changed(Some("pkg/gone.go"), None)]);
        let pkg = &dirs[Path::new("pkg")];
        assert_eq!(pkg.olds.len(), 1);
        assert!(pkg.news.is_empty());
    }

    #[test]
    fn root_level_files_group_under_empty_dir() {
        let dirs = group_by_directory(vec![changed(Some("main.go"), Some("main.go"))]);
        assert!(dirs.contains_key(Path::new("")));
    }
}
