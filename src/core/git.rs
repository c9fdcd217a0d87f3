//! Version-control adapter: enumerates changed source files and materializes
//! their committed content via git child processes.
//!
//! Every invocation buffers stdout/stderr fully before inspection; stderr is
//! matched to tell "path not in the base revision" apart from real failures.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::{debug, trace};

/// A file reported as changed by `git status --porcelain`.
///
/// A plain modification sets both paths to the same value; a deletion keeps
/// only the old path; an addition or copy keeps only the new path; a rename
/// carries both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// Path at the base revision, when the file existed there
    pub old: Option<PathBuf>,
    /// Path in the working tree, when the file still exists
    pub new: Option<PathBuf>,
}

/// Handle on a git working tree and the revision to diff against.
#[derive(Debug, Clone)]
pub struct GitWorktree {
    root: PathBuf,
    base: String,
}

impl GitWorktree {
    pub fn new(root: impl Into<PathBuf>, base: impl Into<String>) -> Self {
        Self { root: root.into(), base: base.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerate changed files whose relevant path carries `extension`.
    pub fn changed_files(&self, extension: &str) -> Result<Vec<ChangedFile>> {
        let args = ["status", "--porcelain"];
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .context("failed to spawn git status")?;
        if !output.status.success() {
            bail!(
                "git {}: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let files = parse_porcelain(&stdout, extension);
        debug!(count = files.len(), "changed source files");
        Ok(files)
    }

    /// Fetch the content of `path` at the base revision.
    ///
    /// Returns `Ok(None)` when the path does not exist at the base, which the
    /// aggregator treats as "no old content" for freshly added files.
    pub fn show_at_base(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        let spec = format!("{}:{}", self.base, path.display());
        trace!(%spec, "git show");
        let output = Command::new("git")
            .args(["show", &spec])
            .current_dir(&self.root)
            .output()
            .context("failed to spawn git show")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains(&format!("but not in '{}'", self.base)) {
                return Ok(None);
            }
            bail!("git show {}: {}", spec, stderr.trim());
        }
        Ok(Some(output.stdout))
    }
}

/// Parse `git status --porcelain` output into change records.
///
/// Lines are split on whitespace; the first field is the status code. Only
/// entries whose relevant path ends in `.{extension}` are retained: the old
/// path for deletions, the new path otherwise.
fn parse_porcelain(stdout: &str, extension: &str) -> Vec<ChangedFile> {
    let mut files = Vec::new();
    for line in stdout.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let (Some(status), Some(last)) = (fields.first(), fields.last()) else {
            continue;
        };

        let record = if status.contains('R') && fields.len() >= 4 {
            ChangedFile {
                old: Some(PathBuf::from(fields[1])),
                new: Some(PathBuf::from(fields[3])),
            }
        } else if status.contains('D') {
            ChangedFile { old: Some(PathBuf::from(*last)), new: None }
        } else if status.contains('C') {
            ChangedFile { old: None, new: Some(PathBuf::from(*last)) }
        } else {
            // Modified, added, or untracked: one path on both sides. For a
            // pure addition the base lookup later reports "no old content".
            ChangedFile {
                old: Some(PathBuf::from(*last)),
                new: Some(PathBuf::from(*last)),
            }
        };

        let relevant = record.new.as_deref().or(record.old.as_deref());
        let matches = relevant
            .and_then(Path::extension)
            .is_some_and(|ext| ext == extension);
        if matches {
            files.push(record);
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(stdout: &str) -> ChangedFile {
        let mut files = parse_porcelain(stdout, "go");
        assert_eq!(files.len(), 1, "expected one record from {stdout:?}");
        files.remove(0)
    }

    #[test]
    fn modified_sets_both_paths() {
        let f = one(" M pkg/api.go\n");
        assert_eq!(f.old.as_deref(), Some(Path::new("pkg/api.go")));
        assert_eq!(f.new.as_deref(), Some(Path::new("pkg/api.go")));
    }

    #[test]
    fn untracked_sets_both_paths() {
        let f = one("?? pkg/new.go\n");
        assert_eq!(f.old.as_deref(), Some(Path::new("pkg/new.go")));
        assert_eq!(f.new.as_deref(), Some(Path::new("pkg/new.go")));
    }

    #[test]
    fn deletion_keeps_only_old_path() {
        let f = one("D  pkg/gone.go\n");
        assert_eq!(f.old.as_deref(), Some(Path::new("pkg/gone.go")));
        assert_eq!(f.new, None);
    }

    #[test]
    fn rename_carries_both_paths() {
        let f = one("R  pkg/a.go -> pkg/b.go\n");
        assert_eq!(f.old.as_deref(), Some(Path::new("pkg/a.go")));
        assert_eq!(f.new.as_deref(), Some(Path::new("pkg/b.go")));
    }

    #[test]
    fn copy_keeps_only_new_path() {
        let f = one("C  pkg/a.go -> pkg/copy.go\n");
        assert_eq!(f.old, None);
        assert_eq!(f.new.as_deref(), Some(Path::new("pkg/copy.go")));
    }

    #[test]
    fn extension_filter_applies_to_relevant_path() {
        assert!(parse_porcelain(" M README.md\n", "go").is_empty());
        assert!(parse_porcelain("D  notes.txt\n", "go").is_empty());
        // A rename away from .go is filtered on the new path.
        assert!(parse_porcelain("R  pkg/a.go -> pkg/a.txt\n", "go").is_empty());
        // A deletion is filtered on the old path.
        assert_eq!(parse_porcelain("D  pkg/a.go\n", "go").len(), 1);
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert!(parse_porcelain("\n\n", "go").is_empty());
    }
}
