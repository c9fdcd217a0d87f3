use std::path::PathBuf;

use clap::{ArgGroup, Parser};

/// Command-line surface: one positional version, one rewrite target.
///
/// At least one of the two must be given; with neither there is nothing to
/// print and nothing to rewrite.
#[derive(Debug, Parser)]
#[command(name = "nextver")]
#[command(about = "Determine the next semantic version from uncommitted Go API changes")]
#[command(long_about = None)]
#[command(group = ArgGroup::new("input").required(true).multiple(true))]
pub struct Cli {
    /// Current version (e.g. v1.2.3); used as the base for the bump
    #[arg(group = "input")]
    pub version: Option<String>,

    /// Go source file whose first version literal is rewritten in place;
    /// without this flag the next version is printed on stdout
    #[arg(short, long, group = "input")]
    pub file: Option<PathBuf>,

    /// Revision to diff the working tree against (default: HEAD)
    #[arg(long)]
    pub base: Option<String>,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_version_or_file() {
        assert!(Cli::try_parse_from(["nextver"]).is_err());
        assert!(Cli::try_parse_from(["nextver", "v1.2.3"]).is_ok());
        assert!(Cli::try_parse_from(["nextver", "--file", "version.go"]).is_ok());
        assert!(Cli::try_parse_from(["nextver", "v1.2.3", "-f", "version.go"]).is_ok());
    }

    #[test]
    fn base_flag_is_optional() {
        let cli = Cli::try_parse_from(["nextver", "v1.2.3", "--base", "main"]).unwrap();
        assert_eq!(cli.base.as_deref(), Some("main"));
    }
}
