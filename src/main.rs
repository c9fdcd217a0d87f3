use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nextver::cli::Cli;
use nextver::core::version::SemanticVersion;
use nextver::core::{detect_change, rewrite_version_literal, GitWorktree};
use nextver::infra::config;

fn setup_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };

    // stdout carries only the version line; diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = config::load_config().unwrap_or_default();
    let base = cli.base.unwrap_or(config.base);

    let seed = cli
        .version
        .as_deref()
        .map(str::parse::<SemanticVersion>)
        .transpose()?;

    let worktree = GitWorktree::new(".", base);
    let change = detect_change(&worktree, &config.extension)?;

    match cli.file {
        Some(path) => rewrite_version_literal(&path, seed, change)?,
        None => {
            let current = seed.unwrap_or_default();
            println!("{}", current.next(change));
        }
    }
    Ok(())
}
