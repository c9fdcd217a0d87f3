//! **nextver** - Semantic-version change detection for Go source trees
//!
//! Classifies the uncommitted delta to a repository's exported Go API as no
//! change, patch, addition, or breaking, and folds that verdict with a prior
//! version into the next one. Go sources are parsed with tree-sitter; the
//! previous state of each file is recovered from git.

/// Command-line interface with clap integration
pub mod cli;

/// Core engine - change detection pipeline from git status to verdict
pub mod core {
    /// Semantic version arithmetic and change severity ordering
    pub mod version;
    pub use self::version::{Change, SemanticVersion};

    /// Git adapter: changed-file listing and base-revision content
    pub mod git;
    pub use self::git::{ChangedFile, GitWorktree};

    /// Declaration-level model of parsed Go files
    pub mod ast;

    /// Canonical-name indexing of exported declarations
    pub mod index;
    pub use self::index::DeclIndex;

    /// Structural comparison under API-compatibility rules
    pub mod diff;

    /// Package grouping and repository-wide verdict folding
    pub mod detect;
    pub use self::detect::detect_change;

    /// In-place rewriting of embedded version literals
    pub mod rewrite;
    pub use self::rewrite::rewrite_version_literal;
}

/// Language processing - Go CST lowering with tree-sitter
pub mod parsers {
    /// Go declaration extraction (types, values, functions, build tags)
    pub mod go_parser;
    pub use self::go_parser::GoParser;
}

/// Infrastructure - configuration
pub mod infra {
    /// Configuration management with TOML support
    pub mod config;
    pub use self::config::{load_config, Config};
}

// Strategic re-exports for the binary and integration tests
pub use crate::cli::Cli;
pub use crate::core::{
    detect_change, rewrite_version_literal, Change, GitWorktree, SemanticVersion,
};
pub use crate::infra::{load_config, Config};
pub use crate::parsers::GoParser;
